use arcstr::ArcStr;
use oxc_index::IndexVec;
use trimpack_common::ModuleIdx;
use trimpack_utils::indexmap::{FxIndexMap, FxIndexSet};

/// Metadata generated for a module during the linking phase.
#[derive(Debug, Default)]
pub struct LinkingMetadata {
  /// Modules that have to be registered wherever this module is, in import order.
  pub dependencies: FxIndexSet<ModuleIdx>,

  /// Targets of `import()` expressions.
  pub dynamic_dependencies: FxIndexSet<ModuleIdx>,

  /// Every name this module exports, following `export *` and `module.exports = require()`
  /// into bundled modules.
  pub resolved_exports: FxIndexSet<ArcStr>,

  /// External modules re-exported as a whole, directly or through bundled modules. Their names
  /// are only known at runtime.
  pub star_exports_from_external_modules: FxIndexSet<ModuleIdx>,

  /// External module -> names this module reads from it. `*` marks a namespace-like use.
  pub imported_external_bindings: FxIndexMap<ModuleIdx, FxIndexSet<ArcStr>>,
}

pub type LinkingMetadataVec = IndexVec<ModuleIdx, LinkingMetadata>;
