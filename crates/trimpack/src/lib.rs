mod analyze_bundle;
mod dependency_optimizer;
mod entry_analyzer;
mod resolve_map_builder;
mod utils;
mod validator;

pub use crate::{
  analyze_bundle::{analyze_bundle, analyze_bundle_with},
  dependency_optimizer::{synthesize_source, DependencyOptimizer, OptimizeOutput},
  entry_analyzer::{EntryAnalysis, EntryAnalyzer, EntrySource},
  resolve_map_builder::{write_resolution_map, ResolveMapBuilder},
  utils::normalize_options::normalize_options,
  validator::{
    artifact_loader::{ArtifactLoader, StaticArtifactLoader},
    Validator,
  },
};
pub use trimpack_bundler::Bundler;
pub use trimpack_common::*;
pub use trimpack_workspace::{
  collect_transitive_workspace_dependencies, discover_workspace, pack_workspace_dependencies,
  DirectoryPackager, WorkspacePackager, WorkspaceResolution, WorkspaceResolver, PACK_BATCH_SIZE,
};
