use oxc_index::IndexVec;
use string_wizard::MagicString;
use trimpack_common::{ExportsKind, ImportForm, ImportKind, ImportRecordIdx, ImportRecordMeta, ImportedName};
use trimpack_utils::{
  concat_string,
  ecmascript::{js_string, property_access_str},
};

use super::ast_scanner::{namespace_binding, Edit, ExportTarget, ScanResult};

/// Where an import record points once resolved.
#[derive(Debug)]
pub enum RecordTarget {
  /// Registry key of a bundled module.
  Module(String),
  /// Specifier of an external module.
  External(String),
  Dropped,
}

/// Applies the scanner edits and, for ES modules, prepends the export and import preamble.
/// The result is the body of the module's init function.
pub fn render_module(
  source: &str,
  scan: &ScanResult,
  targets: &IndexVec<ImportRecordIdx, RecordTarget>,
) -> String {
  let mut magic_string = MagicString::new(source);

  for edit in &scan.edits {
    match edit {
      Edit::Remove(span) => {
        if !span.is_empty() {
          magic_string.remove(span.start as usize, span.end as usize);
        }
      }
      Edit::Replace(span, content) => {
        magic_string.update(span.start as usize, span.end as usize, content.clone());
      }
      Edit::ImportCall { span, record } => {
        let kind = scan.import_records[*record].kind;
        let replacement = match (&targets[*record], kind) {
          (RecordTarget::Module(key), ImportKind::DynamicImport) => {
            concat_string!("__trimpack_dynamic(", js_string(key), ")")
          }
          (RecordTarget::Module(key), _) => {
            concat_string!("__trimpack_require(", js_string(key), ")")
          }
          (RecordTarget::External(specifier), ImportKind::Require) => {
            concat_string!("__trimpack_external_require(", js_string(specifier), ")")
          }
          // `import('external')` is left to the runtime.
          (RecordTarget::External(_) | RecordTarget::Dropped, _) => continue,
        };
        magic_string.update(span.start as usize, span.end as usize, replacement);
      }
    }
  }

  if matches!(scan.exports_kind, ExportsKind::Esm) {
    let preamble = render_esm_preamble(scan, targets);
    if !preamble.is_empty() {
      magic_string.prepend(preamble);
    }
  }

  magic_string.to_string()
}

fn render_esm_preamble(scan: &ScanResult, targets: &IndexVec<ImportRecordIdx, RecordTarget>) -> String {
  let mut preamble = String::new();

  // Getters are registered before any import runs, so cyclic importers see live bindings.
  if !scan.exports.is_empty() {
    preamble.push_str("__trimpack_export(__trimpack_exports, {\n");
    for (name, target) in &scan.exports {
      let value = match target {
        ExportTarget::Local(local) => local.to_string(),
        ExportTarget::Import(idx, ImportedName::Namespace) => namespace_binding(*idx),
        ExportTarget::Import(idx, imported) => {
          property_access_str(&namespace_binding(*idx), imported.as_str())
        }
      };
      preamble.push_str(&concat_string!("  ", js_string(name), ": () => ", value, ",\n"));
    }
    preamble.push_str("});\n");
  }

  for (idx, record) in scan.import_records.iter_enumerated() {
    if !matches!(record.kind, ImportKind::Import) {
      continue;
    }
    let is_plain = record.meta.contains(ImportRecordMeta::IS_PLAIN_IMPORT);
    match &targets[idx] {
      RecordTarget::Dropped => {}
      RecordTarget::Module(key) if is_plain => {
        preamble.push_str(&concat_string!("__trimpack_require(", js_string(key), ");\n"));
      }
      RecordTarget::Module(key) => {
        preamble.push_str(&concat_string!(
          "var ",
          namespace_binding(idx),
          " = __trimpack_interop(__trimpack_require(",
          js_string(key),
          "));\n"
        ));
      }
      RecordTarget::External(specifier) => {
        preamble.push_str(&concat_string!(
          "var ",
          namespace_binding(idx),
          " = __trimpack_external(",
          js_string(specifier),
          ");\n"
        ));
      }
    }
  }

  for (idx, record) in scan.import_records.iter_enumerated() {
    if matches!(record.form, ImportForm::ExportStar) && !matches!(targets[idx], RecordTarget::Dropped) {
      preamble.push_str(&concat_string!(
        "__trimpack_reexport(__trimpack_exports, ",
        namespace_binding(idx),
        ");\n"
      ));
    }
  }

  preamble
}

#[cfg(test)]
use oxc::{allocator::Allocator, semantic::SemanticBuilder, span::SourceType};
#[cfg(test)]
use crate::module_loader::ast_scanner::AstScanner;

#[cfg(test)]
fn render(source: &str, targets: impl Fn(&str) -> RecordTarget) -> (String, ScanResult) {
  let allocator = Allocator::default();
  let program = oxc::parser::Parser::new(&allocator, source, SourceType::mjs()).parse().program;
  let scoping = SemanticBuilder::new().build(&program).semantic.into_scoping();
  let scan = AstScanner::new(source, &scoping, true).scan(&program);
  let targets =
    scan.import_records.iter().map(|record| targets(&record.specifier)).collect::<IndexVec<_, _>>();
  (render_module(source, &scan, &targets), scan)
}

#[test]
fn test_rewrites_import_references() {
  let (code, scan) = render(
    "import pad, { foo } from 'left-pad';\nexport const x = foo(pad);\n",
    |specifier| RecordTarget::External(specifier.to_string()),
  );
  assert_eq!(scan.exports_kind, ExportsKind::Esm);
  assert!(code.contains("var __trimpack_import_0 = __trimpack_external(\"left-pad\");"));
  assert!(code.contains("const x = (0, __trimpack_import_0.foo)(__trimpack_import_0.default);"));
  assert!(code.contains("\"x\": () => x,"));
  assert!(!code.contains("import "));
}

#[test]
fn test_default_exports() {
  let (code, _) = render("export default function () { return 1; }\n", |_| RecordTarget::Dropped);
  assert!(code.contains("function __trimpack_default()"));
  assert!(code.contains("\"default\": () => __trimpack_default,"));

  let (code, _) = render("export default 42;\n", |_| RecordTarget::Dropped);
  assert!(code.contains("const __trimpack_default = 42;"));
}

#[test]
fn test_import_calls() {
  let (code, scan) = render(
    "export const load = () => import('./page.js');\nexport const ext = () => import('plugin-x');\n",
    |specifier| {
      if specifier.starts_with('.') {
        RecordTarget::Module("src/page.js".to_string())
      } else {
        RecordTarget::External(specifier.to_string())
      }
    },
  );
  assert_eq!(scan.import_records.len(), 2);
  assert!(code.contains("__trimpack_dynamic(\"src/page.js\")"));
  assert!(code.contains("import('plugin-x')"));
}

#[test]
fn test_commonjs_module() {
  let (code, scan) = render(
    "const dep = require('./dep.js');\nexports.a = dep;\nmodule.exports.b = 1;\n",
    |_| RecordTarget::Module("dep.js".to_string()),
  );
  assert_eq!(scan.exports_kind, ExportsKind::CommonJs);
  assert!(code.contains("const dep = __trimpack_require(\"dep.js\");"));
  let names = scan.local_exports.iter().map(|name| name.as_str()).collect::<Vec<_>>();
  assert_eq!(names, vec!["a", "b", "default"]);
}

#[test]
fn test_unused_import_is_plain() {
  let (code, scan) = render("import { unused } from './side.js';\n", |_| {
    RecordTarget::Module("side.js".to_string())
  });
  assert!(scan.import_records[ImportRecordIdx::from_usize(0)]
    .meta
    .contains(ImportRecordMeta::IS_PLAIN_IMPORT));
  assert_eq!(code.trim(), "__trimpack_require(\"side.js\");");
}
