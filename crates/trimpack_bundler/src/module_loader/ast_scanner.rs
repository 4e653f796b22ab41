use arcstr::ArcStr;
use oxc::{
  ast::ast::{
    AssignmentExpression, AssignmentTarget, CallExpression, Class, Declaration,
    ExportAllDeclaration, ExportDefaultDeclaration, ExportDefaultDeclarationKind,
    ExportNamedDeclaration, Expression, Function, IdentifierReference, ImportDeclaration,
    ImportDeclarationSpecifier, ImportExpression, ObjectExpression, ObjectProperty,
    ObjectPropertyKind, Program, Statement,
  },
  ast_visit::{walk, Visit},
  semantic::{ScopeFlags, Scoping, SymbolId},
  span::{GetSpan, Span},
};
use oxc_index::IndexVec;
use rustc_hash::FxHashMap;
use trimpack_common::{
  ExportsKind, ImportBinding, ImportForm, ImportKind, ImportRecordIdx, ImportRecordMeta,
  ImportedName, RawImportRecord,
};
use trimpack_utils::{ecmascript::property_access_str, indexmap::FxIndexSet};

pub const DEFAULT_EXPORT_BINDING: &str = "__trimpack_default";

/// Name of the variable holding the namespace of import record `idx` inside a module body.
pub fn namespace_binding(idx: ImportRecordIdx) -> String {
  format!("__trimpack_import_{}", idx.index())
}

/// A rewrite of a source range, applied once every import record is resolved.
#[derive(Debug)]
pub enum Edit {
  Remove(Span),
  Replace(Span, String),
  /// `require('...')` or `import('...')`, rewritten against the resolved module.
  ImportCall { span: Span, record: ImportRecordIdx },
}

#[derive(Debug)]
pub enum ExportTarget {
  /// A binding declared by the module itself.
  Local(ArcStr),
  Import(ImportRecordIdx, ImportedName),
}

#[derive(Debug)]
pub struct ScanResult {
  pub import_records: IndexVec<ImportRecordIdx, RawImportRecord>,
  /// Exported name -> binding it reads, in declaration order. Empty for CommonJS.
  pub exports: Vec<(ArcStr, ExportTarget)>,
  pub local_exports: FxIndexSet<ArcStr>,
  pub edits: Vec<Edit>,
  pub exports_kind: ExportsKind,
}

pub struct AstScanner<'me, 'ast> {
  source: &'ast str,
  scoping: &'me Scoping,
  treeshake: bool,
  import_records: IndexVec<ImportRecordIdx, RawImportRecord>,
  exports: Vec<(ArcStr, ExportTarget)>,
  edits: Vec<Edit>,
  /// Symbols of import bindings. References to them are rewritten to namespace accesses.
  import_symbols: FxHashMap<SymbolId, (ImportRecordIdx, ImportedName)>,
  import_locals: FxHashMap<ArcStr, (ImportRecordIdx, ImportedName)>,
  cjs_exports: FxIndexSet<ArcStr>,
  has_module_syntax: bool,
}

impl<'me, 'ast> AstScanner<'me, 'ast> {
  pub fn new(source: &'ast str, scoping: &'me Scoping, treeshake: bool) -> Self {
    Self {
      source,
      scoping,
      treeshake,
      import_records: IndexVec::default(),
      exports: Vec::new(),
      edits: Vec::new(),
      import_symbols: FxHashMap::default(),
      import_locals: FxHashMap::default(),
      cjs_exports: FxIndexSet::default(),
      has_module_syntax: false,
    }
  }

  pub fn scan(mut self, program: &Program<'ast>) -> ScanResult {
    // Import bindings are hoisted, so they are collected before any reference is visited.
    for stmt in &program.body {
      match stmt {
        Statement::ImportDeclaration(decl) => self.scan_import_declaration(decl),
        Statement::ExportAllDeclaration(decl) => self.scan_export_all_declaration(decl),
        Statement::ExportNamedDeclaration(decl) if decl.source.is_some() => {
          self.scan_reexport_declaration(decl);
        }
        _ => {}
      }
    }

    for stmt in &program.body {
      match stmt {
        Statement::ImportDeclaration(_) | Statement::ExportAllDeclaration(_) => {}
        Statement::ExportNamedDeclaration(decl) => {
          if decl.source.is_none() {
            self.scan_export_named_declaration(decl);
          }
        }
        Statement::ExportDefaultDeclaration(decl) => self.scan_export_default_declaration(decl),
        _ => self.visit_statement(stmt),
      }
    }

    self.finish()
  }

  fn finish(self) -> ScanResult {
    let exports_kind =
      if self.has_module_syntax { ExportsKind::Esm } else { ExportsKind::CommonJs };
    let local_exports = match exports_kind {
      ExportsKind::Esm => self.exports.iter().map(|(name, _)| ArcStr::clone(name)).collect(),
      ExportsKind::CommonJs => {
        let mut names = self.cjs_exports;
        names.insert(arcstr::literal!("default"));
        names
      }
    };
    ScanResult {
      import_records: self.import_records,
      exports: self.exports,
      local_exports,
      edits: self.edits,
      exports_kind,
    }
  }

  fn scan_import_declaration(&mut self, decl: &ImportDeclaration<'ast>) {
    self.has_module_syntax = true;

    let bindings = decl
      .specifiers
      .iter()
      .flatten()
      .map(|spec| {
        let (imported, local) = match spec {
          ImportDeclarationSpecifier::ImportSpecifier(spec) => {
            (ImportedName::from(spec.imported.name().as_str()), &spec.local)
          }
          ImportDeclarationSpecifier::ImportDefaultSpecifier(spec) => {
            (ImportedName::Default, &spec.local)
          }
          ImportDeclarationSpecifier::ImportNamespaceSpecifier(spec) => {
            (ImportedName::Namespace, &spec.local)
          }
        };
        let symbol_id = local.symbol_id();
        let referenced =
          !self.treeshake || !self.scoping.get_resolved_reference_ids(symbol_id).is_empty();
        (ImportBinding { imported, local: local.name.as_str().into(), referenced }, symbol_id)
      })
      .collect::<Vec<_>>();

    let is_plain = bindings.iter().all(|(binding, _)| !binding.referenced);
    let form = ImportForm::Import(bindings.iter().map(|(binding, _)| binding.clone()).collect());
    let mut record =
      RawImportRecord::new(decl.source.value.as_str().into(), ImportKind::Import, form, decl.span);
    if is_plain {
      record = record.with_meta(ImportRecordMeta::IS_PLAIN_IMPORT);
    }
    let idx = self.import_records.push(record);

    for (binding, symbol_id) in bindings {
      self.import_symbols.insert(symbol_id, (idx, binding.imported.clone()));
      self.import_locals.insert(binding.local, (idx, binding.imported));
    }
    self.edits.push(Edit::Remove(decl.span));
  }

  fn scan_export_all_declaration(&mut self, decl: &ExportAllDeclaration<'ast>) {
    self.has_module_syntax = true;

    let specifier = decl.source.value.as_str().into();
    if let Some(exported) = &decl.exported {
      let name: ArcStr = exported.name().as_str().into();
      let form = ImportForm::ReExport(vec![(ImportedName::Namespace, ArcStr::clone(&name))]);
      let idx = self.import_records.push(RawImportRecord::new(
        specifier,
        ImportKind::Import,
        form,
        decl.span,
      ));
      self.exports.push((name, ExportTarget::Import(idx, ImportedName::Namespace)));
    } else {
      self.import_records.push(RawImportRecord::new(
        specifier,
        ImportKind::Import,
        ImportForm::ExportStar,
        decl.span,
      ));
    }
    self.edits.push(Edit::Remove(decl.span));
  }

  fn scan_reexport_declaration(&mut self, decl: &ExportNamedDeclaration<'ast>) {
    let Some(source) = &decl.source else {
      return;
    };
    self.has_module_syntax = true;

    let items = decl
      .specifiers
      .iter()
      .map(|spec| {
        let imported = ImportedName::from(spec.local.name().as_str());
        (imported, ArcStr::from(spec.exported.name().as_str()))
      })
      .collect::<Vec<_>>();
    let mut record = RawImportRecord::new(
      source.value.as_str().into(),
      ImportKind::Import,
      ImportForm::ReExport(items.clone()),
      decl.span,
    );
    if items.is_empty() {
      record = record.with_meta(ImportRecordMeta::IS_PLAIN_IMPORT);
    }
    let idx = self.import_records.push(record);

    for (imported, exported) in items {
      self.exports.push((exported, ExportTarget::Import(idx, imported)));
    }
    self.edits.push(Edit::Remove(decl.span));
  }

  fn scan_export_named_declaration(&mut self, decl: &ExportNamedDeclaration<'ast>) {
    self.has_module_syntax = true;

    if let Some(declaration) = &decl.declaration {
      // `export const a = 1` -> `const a = 1`
      self.edits.push(Edit::Remove(Span::new(decl.span.start, declaration.span().start)));
      for name in declared_names(declaration) {
        self.exports.push((ArcStr::clone(&name), ExportTarget::Local(name)));
      }
      self.visit_declaration(declaration);
      return;
    }

    for spec in &decl.specifiers {
      let local = spec.local.name();
      let exported = ArcStr::from(spec.exported.name().as_str());
      let target = match self.import_locals.get(local.as_str()) {
        Some((idx, imported)) => ExportTarget::Import(*idx, imported.clone()),
        None => ExportTarget::Local(local.as_str().into()),
      };
      self.exports.push((exported, target));
    }
    self.edits.push(Edit::Remove(decl.span));
  }

  fn scan_export_default_declaration(&mut self, decl: &ExportDefaultDeclaration<'ast>) {
    self.has_module_syntax = true;

    let local = match &decl.declaration {
      ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
        let local = self.rewrite_default_function(decl.span, func);
        self.visit_function(func, ScopeFlags::Function);
        local
      }
      ExportDefaultDeclarationKind::ClassDeclaration(class) => {
        let local = self.rewrite_default_class(decl.span, class);
        self.visit_class(class);
        local
      }
      kind => {
        if let Some(expr) = kind.as_expression() {
          self.edits.push(Edit::Replace(
            Span::new(decl.span.start, expr.span().start),
            format!("const {DEFAULT_EXPORT_BINDING} = "),
          ));
          self.visit_expression(expr);
        }
        ArcStr::from(DEFAULT_EXPORT_BINDING)
      }
    };
    self.exports.push((arcstr::literal!("default"), ExportTarget::Local(local)));
  }

  /// `export default function foo() {}` keeps `foo`. An anonymous function gets a name so it
  /// stays a hoisted declaration.
  fn rewrite_default_function(&mut self, span: Span, func: &Function<'ast>) -> ArcStr {
    if let Some(id) = &func.id {
      self.edits.push(Edit::Remove(Span::new(span.start, func.span.start)));
      return id.name.as_str().into();
    }
    let keyword =
      self.source[func.span.start as usize..func.params.span.start as usize].trim_end();
    self.edits.push(Edit::Replace(
      Span::new(span.start, func.params.span.start),
      format!("{keyword} {DEFAULT_EXPORT_BINDING}"),
    ));
    ArcStr::from(DEFAULT_EXPORT_BINDING)
  }

  fn rewrite_default_class(&mut self, span: Span, class: &Class<'ast>) -> ArcStr {
    if let Some(id) = &class.id {
      self.edits.push(Edit::Remove(Span::new(span.start, class.span.start)));
      return id.name.as_str().into();
    }
    if self.source[class.span.start as usize..].starts_with("class") {
      self.edits.push(Edit::Replace(
        Span::new(span.start, class.span.start + 5),
        format!("class {DEFAULT_EXPORT_BINDING}"),
      ));
    } else {
      self.edits.push(Edit::Replace(
        Span::new(span.start, class.span.start),
        format!("const {DEFAULT_EXPORT_BINDING} = "),
      ));
    }
    ArcStr::from(DEFAULT_EXPORT_BINDING)
  }

  fn add_import_call(
    &mut self,
    specifier: &str,
    kind: ImportKind,
    span: Span,
    meta: ImportRecordMeta,
  ) {
    let record =
      RawImportRecord::new(specifier.into(), kind, ImportForm::Expression, span).with_meta(meta);
    let idx = self.import_records.push(record);
    self.edits.push(Edit::ImportCall { span, record: idx });
  }

  fn is_unresolved(&self, ident: &IdentifierReference<'ast>) -> bool {
    self.scoping.get_reference(ident.reference_id()).symbol_id().is_none()
  }

  /// `true` for a reference to the global `name`, one not shadowed by any declaration.
  fn is_global(&self, expr: &Expression<'ast>, name: &str) -> bool {
    matches!(
      expr,
      Expression::Identifier(ident) if ident.name.as_str() == name && self.is_unresolved(ident)
    )
  }

  fn is_module_exports(&self, expr: &Expression<'ast>) -> bool {
    matches!(
      expr,
      Expression::StaticMemberExpression(member)
        if member.property.name.as_str() == "exports" && self.is_global(&member.object, "module")
    )
  }

  fn is_exports_object(&self, expr: &Expression<'ast>) -> bool {
    self.is_global(expr, "exports") || self.is_module_exports(expr)
  }

  /// `require('x')` with the global `require` and a single string literal.
  fn require_call_specifier(&self, call: &CallExpression<'ast>) -> Option<&'ast str> {
    if !self.is_global(&call.callee, "require") || call.arguments.len() != 1 {
      return None;
    }
    match call.arguments.first()?.as_expression()? {
      Expression::StringLiteral(lit) => Some(lit.value.as_str()),
      _ => None,
    }
  }

  /// `Object.defineProperty(exports, 'name', ...)`, as emitted by most CommonJS transpilers.
  fn scan_define_property(&mut self, call: &CallExpression<'ast>) {
    let Expression::StaticMemberExpression(callee) = &call.callee else {
      return;
    };
    if callee.property.name.as_str() != "defineProperty"
      || !self.is_global(&callee.object, "Object")
    {
      return;
    }
    let mut args = call.arguments.iter().filter_map(|arg| arg.as_expression());
    let (Some(target), Some(Expression::StringLiteral(name))) = (args.next(), args.next()) else {
      return;
    };
    if self.is_exports_object(target) && name.value.as_str() != "__esModule" {
      self.cjs_exports.insert(name.value.as_str().into());
    }
  }

  fn scan_object_keys(&mut self, object: &ObjectExpression<'ast>) {
    for property in &object.properties {
      if let ObjectPropertyKind::ObjectProperty(property) = property {
        if let Some(name) = property.key.static_name() {
          self.cjs_exports.insert(name.as_ref().into());
        }
      }
    }
  }

  fn import_access(&self, ident: &IdentifierReference<'ast>) -> Option<String> {
    let symbol_id = self.scoping.get_reference(ident.reference_id()).symbol_id()?;
    let (idx, imported) = self.import_symbols.get(&symbol_id)?;
    let namespace = namespace_binding(*idx);
    Some(match imported {
      ImportedName::Namespace => namespace,
      imported => property_access_str(&namespace, imported.as_str()),
    })
  }
}

fn declared_names(declaration: &Declaration<'_>) -> Vec<ArcStr> {
  match declaration {
    Declaration::VariableDeclaration(decl) => decl
      .declarations
      .iter()
      .flat_map(|declarator| declarator.id.get_binding_identifiers())
      .map(|id| id.name.as_str().into())
      .collect(),
    Declaration::FunctionDeclaration(func) => {
      func.id.iter().map(|id| id.name.as_str().into()).collect()
    }
    Declaration::ClassDeclaration(class) => {
      class.id.iter().map(|id| id.name.as_str().into()).collect()
    }
    _ => vec![],
  }
}

impl<'ast> Visit<'ast> for AstScanner<'_, 'ast> {
  fn visit_identifier_reference(&mut self, it: &IdentifierReference<'ast>) {
    if let Some(access) = self.import_access(it) {
      self.edits.push(Edit::Replace(it.span, access));
    }
  }

  fn visit_object_property(&mut self, it: &ObjectProperty<'ast>) {
    if it.shorthand {
      if let Expression::Identifier(ident) = &it.value {
        if let Some(access) = self.import_access(ident) {
          self.edits.push(Edit::Replace(it.span, format!("{}: {access}", ident.name)));
          return;
        }
      }
    }
    walk::walk_object_property(self, it);
  }

  fn visit_call_expression(&mut self, it: &CallExpression<'ast>) {
    if let Some(specifier) = self.require_call_specifier(it) {
      self.add_import_call(specifier, ImportKind::Require, it.span, ImportRecordMeta::empty());
      return;
    }

    self.scan_define_property(it);

    // `foo()` -> `(0, ns.foo)()`, keeping `this` undefined inside the callee.
    if let Expression::Identifier(callee) = &it.callee {
      if let Some(access) = self.import_access(callee) {
        self.edits.push(Edit::Replace(callee.span, format!("(0, {access})")));
        for arg in &it.arguments {
          self.visit_argument(arg);
        }
        return;
      }
    }

    walk::walk_call_expression(self, it);
  }

  fn visit_import_expression(&mut self, it: &ImportExpression<'ast>) {
    if let Expression::StringLiteral(source) = &it.source {
      self.add_import_call(
        source.value.as_str(),
        ImportKind::DynamicImport,
        it.span,
        ImportRecordMeta::empty(),
      );
      return;
    }
    walk::walk_import_expression(self, it);
  }

  fn visit_assignment_expression(&mut self, it: &AssignmentExpression<'ast>) {
    if let AssignmentTarget::StaticMemberExpression(member) = &it.left {
      let name = member.property.name.as_str();
      if self.is_exports_object(&member.object) {
        // `exports.foo = ...` and `module.exports.foo = ...`
        if name != "__esModule" {
          self.cjs_exports.insert(name.into());
        }
      } else if name == "exports" && self.is_global(&member.object, "module") {
        match &it.right {
          Expression::ObjectExpression(object) => self.scan_object_keys(object),
          Expression::CallExpression(call) => {
            if let Some(specifier) = self.require_call_specifier(call) {
              self.add_import_call(
                specifier,
                ImportKind::Require,
                call.span,
                ImportRecordMeta::IS_CJS_REEXPORT,
              );
              return;
            }
          }
          _ => {}
        }
      }
    }
    walk::walk_assignment_expression(self, it);
  }
}
