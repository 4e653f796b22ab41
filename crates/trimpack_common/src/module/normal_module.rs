use arcstr::ArcStr;
use oxc_index::IndexVec;
use trimpack_utils::indexmap::FxIndexSet;

use crate::{
  ImportForm, ImportRecordIdx, ImportRecordMeta, ModuleId, ModuleIdx, ModuleType,
  ResolvedImportRecord,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportsKind {
  Esm,
  CommonJs,
}

#[derive(Debug)]
pub enum ModuleBody {
  /// Body of the module's init function, already rewritten against the module registry.
  Script(String),
  /// Raw bytes of an emitted file.
  Asset(Vec<u8>),
}

#[derive(Debug)]
pub struct NormalModule {
  pub idx: ModuleIdx,
  pub id: ModuleId,
  /// `id` relative to the cwd. Used as the registry key in the generated code.
  pub stable_id: String,
  /// Readable name derived from the file path, used to name chunks and assets.
  pub repr_name: String,
  pub module_type: ModuleType,
  pub exports_kind: ExportsKind,
  pub exec_order: u32,
  pub is_user_defined_entry: bool,
  pub body: ModuleBody,
  pub import_records: IndexVec<ImportRecordIdx, ResolvedImportRecord>,
  /// Names declared by the module itself. For CommonJS modules, the statically visible
  /// `exports.x = ...` assignments.
  pub local_exports: FxIndexSet<ArcStr>,
  pub has_side_effects: bool,
}

impl NormalModule {
  /// Records whose module is re-exported as a whole: `export * from` in ES modules and
  /// `module.exports = require()` in CommonJS.
  pub fn star_export_records(&self) -> impl Iterator<Item = &ResolvedImportRecord> {
    self.import_records.iter().filter(|rec| {
      !rec.is_dropped()
        && (matches!(rec.form, ImportForm::ExportStar)
          || rec.meta.contains(ImportRecordMeta::IS_CJS_REEXPORT))
    })
  }

  pub fn is_commonjs(&self) -> bool {
    matches!(self.exports_kind, ExportsKind::CommonJs)
  }
}
