use arcstr::ArcStr;
use trimpack_utils::indexmap::FxIndexMap;

use crate::ModuleId;

#[derive(Debug, Clone, Default)]
pub struct OutputChunk {
  pub name: ArcStr,
  /// Relative to the output directory, always with `/` separators.
  pub filename: ArcStr,
  pub is_entry: bool,
  pub is_dynamic_entry: bool,
  pub facade_module_id: Option<ModuleId>,
  /// Modules rendered into this chunk, in execution order.
  pub module_ids: Vec<ModuleId>,
  pub exports: Vec<String>,
  /// Statically imported chunk file names (relative to the output directory) and external
  /// specifiers.
  pub imports: Vec<String>,
  pub dynamic_imports: Vec<String>,
  /// External specifier -> names read from it. `*` marks a namespace-like use.
  pub imported_bindings: FxIndexMap<String, Vec<String>>,
  pub code: String,
}

impl OutputChunk {
  pub fn is_static_entry(&self) -> bool {
    self.is_entry && !self.is_dynamic_entry
  }
}
