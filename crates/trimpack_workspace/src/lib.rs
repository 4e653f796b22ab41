mod discovery;
mod packager;
mod resolver;
mod transitive;

pub use crate::{
  discovery::{discover_workspace, DiscoveredWorkspace},
  packager::{pack_workspace_dependencies, DirectoryPackager, WorkspacePackager, PACK_BATCH_SIZE},
  resolver::{WorkspaceResolution, WorkspaceResolver},
  transitive::collect_transitive_workspace_dependencies,
};
