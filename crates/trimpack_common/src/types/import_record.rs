use std::fmt::Debug;

use arcstr::ArcStr;
use oxc::span::Span;

use crate::{ImportKind, ModuleIdx};

pub type RawImportRecord = ImportRecord<Span>;
pub type ResolvedImportRecord = ImportRecord<ModuleIdx>;

bitflags::bitflags! {
  #[derive(Debug, Clone, Copy, PartialEq, Eq)]
  pub struct ImportRecordMeta: u8 {
    /// `import '...'`, or an import whose bindings are all unused.
    const IS_PLAIN_IMPORT = 1;
    /// The imported module is side-effect free and nothing is used from it. The record stays
    /// for diagnostics, but the module is never loaded.
    const IS_DROPPED = 1 << 1;
    /// `module.exports = require('...')`
    const IS_CJS_REEXPORT = 1 << 2;
  }
}

/// The export a binding reads from the imported module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImportedName {
  Default,
  Named(ArcStr),
  Namespace,
}

impl ImportedName {
  /// `*` stands for the whole namespace.
  pub fn as_str(&self) -> &str {
    match self {
      Self::Default => "default",
      Self::Named(name) => name,
      Self::Namespace => "*",
    }
  }
}

impl From<&str> for ImportedName {
  fn from(value: &str) -> Self {
    match value {
      "default" => Self::Default,
      "*" => Self::Namespace,
      name => Self::Named(name.into()),
    }
  }
}

#[derive(Debug, Clone)]
pub struct ImportBinding {
  pub imported: ImportedName,
  /// `b` in `import { a as b } from '...'`
  pub local: ArcStr,
  pub referenced: bool,
}

#[derive(Debug, Clone)]
pub enum ImportForm {
  /// `import a, { b as c }, * as d from '...'` and `import '...'`
  Import(Vec<ImportBinding>),
  /// `export { a as b } from '...'` and `export * as ns from '...'`. Pairs of imported name and
  /// exported name.
  ReExport(Vec<(ImportedName, ArcStr)>),
  /// `export * from '...'`
  ExportStar,
  /// `import('...')`, `require('...')`. The whole namespace escapes into an expression.
  Expression,
}

#[derive(Debug)]
pub struct ImportRecord<State: Debug> {
  pub state: State,
  /// `./lib.js` in `import { foo } from './lib.js';`
  pub specifier: ArcStr,
  pub kind: ImportKind,
  pub form: ImportForm,
  pub meta: ImportRecordMeta,
}

impl<State: Debug> ImportRecord<State> {
  pub fn is_dropped(&self) -> bool {
    self.meta.contains(ImportRecordMeta::IS_DROPPED)
  }

  /// Names read from the imported module, `*` when it is used as a whole. Unused bindings are
  /// not listed, so a plain import yields an empty list.
  pub fn used_names(&self) -> Vec<&str> {
    match &self.form {
      ImportForm::Import(bindings) => bindings
        .iter()
        .filter(|binding| binding.referenced)
        .map(|binding| binding.imported.as_str())
        .collect(),
      ImportForm::ReExport(items) => items.iter().map(|(imported, _)| imported.as_str()).collect(),
      ImportForm::ExportStar | ImportForm::Expression => vec!["*"],
    }
  }
}

impl RawImportRecord {
  pub fn new(specifier: ArcStr, kind: ImportKind, form: ImportForm, span: Span) -> Self {
    Self { specifier, kind, form, meta: ImportRecordMeta::empty(), state: span }
  }

  #[must_use]
  pub fn with_meta(mut self, meta: ImportRecordMeta) -> Self {
    self.meta |= meta;
    self
  }

  pub fn into_resolved(self, resolved_module: ModuleIdx) -> ResolvedImportRecord {
    ResolvedImportRecord {
      state: resolved_module,
      specifier: self.specifier,
      kind: self.kind,
      form: self.form,
      meta: self.meta,
    }
  }
}

#[test]
fn test_used_names() {
  let record = RawImportRecord::new(
    "left-pad".into(),
    ImportKind::Import,
    ImportForm::Import(vec![
      ImportBinding { imported: "foo".into(), local: "foo".into(), referenced: true },
      ImportBinding { imported: ImportedName::Default, local: "pad".into(), referenced: false },
    ]),
    Span::default(),
  );
  assert_eq!(record.used_names(), vec!["foo"]);

  let record = RawImportRecord::new(
    "left-pad".into(),
    ImportKind::DynamicImport,
    ImportForm::Expression,
    Span::default(),
  );
  assert_eq!(record.used_names(), vec!["*"]);
}
