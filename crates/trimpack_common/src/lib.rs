mod analyze_options;
mod chunk;
mod compile_options;
mod compiler;
mod constants;
mod module;
mod types;

pub use crate::{
  analyze_options::{
    external_policy::{DEFAULT_ALWAYS_EXTERNAL, ExternalPolicy},
    normalized_analyze_options::NormalizedAnalyzeOptions,
    AnalyzeOptions,
  },
  chunk::Chunk,
  compile_options::{
    external_option::ExternalOption, filename_template::FilenameTemplate, input_item::InputItem,
    normalized_compile_options::NormalizedCompileOptions, platform::Platform, CompileOptions,
  },
  compiler::{CompileOutput, ModuleCompiler},
  constants::{
    MODULE_RESOLVE_MAP_FILENAME, RUNTIME_ENTRY_ALIASES, TOOL_BINDINGS_ALIAS,
    VIRTUAL_MODULE_PREFIX,
  },
  module::{
    external_module::ExternalModule,
    normal_module::{ExportsKind, ModuleBody, NormalModule},
    Module,
  },
  types::{
    chunk_kind::ChunkKind,
    dependency_metadata::{DependencyExports, DependencyMetadata},
    entry_point::{EntryPoint, EntryPointKind},
    import_kind::ImportKind,
    import_record::{
      ImportBinding, ImportForm, ImportRecord, ImportRecordMeta, ImportedName, RawImportRecord,
      ResolvedImportRecord,
    },
    module_id::ModuleId,
    module_type::ModuleType,
    output::Output,
    output_asset::OutputAsset,
    output_chunk::OutputChunk,
    package_json::{PackageJson, SideEffects, Workspaces},
    raw_idx::{ChunkIdx, DUMMY_MODULE_IDX, ImportRecordIdx, ModuleIdx},
    resolution_map::ResolutionMap,
    resolved_id::ResolvedId,
    validation_result::ValidationResult,
    virtual_dependency_entry::VirtualDependencyEntry,
    workspace_package_info::{WorkspaceMap, WorkspacePackageInfo},
  },
};

/// Id under which a synthesized module named `name` is served.
pub fn virtual_module_id(name: &str) -> String {
  trimpack_utils::concat_string!(VIRTUAL_MODULE_PREFIX, name)
}
