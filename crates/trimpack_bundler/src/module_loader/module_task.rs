use std::{path::Path, sync::Arc};

use anyhow::anyhow;
use arcstr::ArcStr;
use oxc::{allocator::Allocator, semantic::SemanticBuilder, span::SourceType};
use oxc_index::IndexVec;
use trimpack_common::{
  ExportsKind, ImportKind, ImportRecordIdx, ImportRecordMeta, ModuleBody, ModuleId, ModuleIdx,
  ModuleType, NormalModule, RawImportRecord, ResolvedId,
};
use trimpack_ecmascript::{source_type_for, EcmaCompiler};
use trimpack_error::{BuildError, BuildResult};
use trimpack_utils::{
  ecmascript::legitimize_identifier_name, indexmap::FxIndexSet, package_name::is_bare_specifier,
  path_ext::PathExt,
};

use crate::utils::{load_source::load_source, resolve_id::resolve_id};

use super::{
  ast_scanner::AstScanner,
  render_module::{render_module, RecordTarget},
  task_context::TaskContext,
  ModuleLoaderMsg, NormalModuleTaskResult,
};

/// Parts of a module that depend on its type.
struct ModuleContent {
  body: ModuleBody,
  exports_kind: ExportsKind,
  local_exports: FxIndexSet<ArcStr>,
  import_records: IndexVec<ImportRecordIdx, RawImportRecord>,
  resolved_deps: IndexVec<ImportRecordIdx, ResolvedId>,
}

impl ModuleContent {
  fn commonjs(body: ModuleBody) -> Self {
    Self {
      body,
      exports_kind: ExportsKind::CommonJs,
      local_exports: FxIndexSet::from_iter([arcstr::literal!("default")]),
      import_records: IndexVec::default(),
      resolved_deps: IndexVec::default(),
    }
  }
}

pub struct ModuleTask {
  ctx: Arc<TaskContext>,
  idx: ModuleIdx,
  /// Stable id of the first importer, for diagnostics.
  owner: Option<String>,
  resolved_id: ResolvedId,
  is_user_defined_entry: bool,
}

impl ModuleTask {
  pub fn new(
    ctx: Arc<TaskContext>,
    idx: ModuleIdx,
    owner: Option<String>,
    resolved_id: ResolvedId,
    is_user_defined_entry: bool,
  ) -> Self {
    Self { ctx, idx, owner, resolved_id, is_user_defined_entry }
  }

  pub async fn run(self) {
    let msg = match self.build() {
      Ok(result) => ModuleLoaderMsg::NormalModuleDone(Box::new(result)),
      Err(errs) => ModuleLoaderMsg::BuildErrors(errs.into_vec()),
    };
    // The receiver only goes away when the build was already aborted.
    let _ = self.ctx.tx.send(msg).await;
  }

  fn debug_id(&self) -> String {
    let id = self.resolved_id.debug_id(&self.ctx.options.cwd);
    match &self.owner {
      Some(owner) => format!("{id} (imported by {owner})"),
      None => id,
    }
  }

  fn build(&self) -> BuildResult<NormalModuleTaskResult> {
    let mut warnings = vec![];

    let (source, module_type) = load_source(&self.ctx.fs, &self.ctx.options, &self.resolved_id)
      .map_err(|err| anyhow!("Could not load {}: {err}", self.debug_id()))?;

    let content = match module_type {
      ModuleType::Asset => ModuleContent::commonjs(ModuleBody::Asset(source.into_bytes())),
      ModuleType::Json => {
        let source = source.try_into_string()?;
        serde_json::from_str::<serde_json::Value>(&source)
          .map_err(|err| anyhow!("Invalid JSON in {}: {err}", self.debug_id()))?;
        ModuleContent::commonjs(ModuleBody::Script(format!("module.exports = {};\n", source.trim())))
      }
      _ => self.build_ecma_module(&source.try_into_string()?, module_type, &mut warnings)?,
    };

    let id = ModuleId::new(ArcStr::clone(&self.resolved_id.id));
    let path = Path::new(self.resolved_id.id.as_str());
    let module = NormalModule {
      idx: self.idx,
      stable_id: id.stabilize(&self.ctx.options.cwd),
      repr_name: legitimize_identifier_name(&path.representative_file_name()),
      id,
      module_type,
      exports_kind: content.exports_kind,
      exec_order: u32::MAX,
      is_user_defined_entry: self.is_user_defined_entry,
      body: content.body,
      import_records: IndexVec::default(),
      local_exports: content.local_exports,
      has_side_effects: self
        .resolved_id
        .package_json
        .as_ref()
        .is_none_or(|package_json| package_json.has_side_effects(path)),
    };

    Ok(NormalModuleTaskResult {
      module,
      raw_import_records: content.import_records,
      resolved_deps: content.resolved_deps,
      warnings,
    })
  }

  fn build_ecma_module(
    &self,
    source: &str,
    module_type: ModuleType,
    warnings: &mut Vec<anyhow::Error>,
  ) -> BuildResult<ModuleContent> {
    let path = Path::new(self.resolved_id.id.as_str());

    let (source, source_type) = if module_type.needs_transform() {
      if !self.ctx.options.is_in_transform_scope(path) {
        Err(anyhow!(
          "{} is TypeScript or JSX but its package is not listed in `transpilePackages`",
          self.debug_id()
        ))?;
      }
      let transformed = EcmaCompiler::transform(source, path, source_type_for(module_type, path))
        .map_err(|errs| self.with_context(errs))?;
      (transformed, SourceType::unambiguous())
    } else {
      (source.to_string(), source_type_for(module_type, path))
    };

    let allocator = Allocator::default();
    let program = EcmaCompiler::parse(&allocator, &source, source_type)
      .map_err(|errs| self.with_context(errs))?;
    let scoping = SemanticBuilder::new().build(&program).semantic.into_scoping();
    let mut scan = AstScanner::new(&source, &scoping, self.ctx.options.treeshake).scan(&program);

    let resolved_deps = self.resolve_dependencies(&scan.import_records, warnings)?;

    // A side-effect free module that nothing reads from is never loaded.
    if self.ctx.options.treeshake {
      for (idx, record) in scan.import_records.iter_mut_enumerated() {
        let resolved = &resolved_deps[idx];
        let is_unused = matches!(record.kind, ImportKind::Import)
          && record.meta.contains(ImportRecordMeta::IS_PLAIN_IMPORT);
        if is_unused
          && !resolved.is_external
          && resolved.package_json.as_ref().is_some_and(|package_json| {
            !package_json.has_side_effects(Path::new(resolved.id.as_str()))
          })
        {
          record.meta |= ImportRecordMeta::IS_DROPPED;
        }
      }
    }

    let targets = scan
      .import_records
      .iter_enumerated()
      .map(|(idx, record)| {
        let resolved = &resolved_deps[idx];
        if record.is_dropped() {
          RecordTarget::Dropped
        } else if resolved.is_external {
          RecordTarget::External(resolved.id.to_string())
        } else {
          RecordTarget::Module(
            ModuleId::new(ArcStr::clone(&resolved.id)).stabilize(&self.ctx.options.cwd),
          )
        }
      })
      .collect::<IndexVec<ImportRecordIdx, _>>();

    let body = render_module(&source, &scan, &targets);

    Ok(ModuleContent {
      body: ModuleBody::Script(body),
      exports_kind: scan.exports_kind,
      local_exports: scan.local_exports,
      import_records: scan.import_records,
      resolved_deps,
    })
  }

  /// Unresolvable bare specifiers become externals, the host environment may still provide them.
  /// Relative or absolute specifiers that fail to resolve are errors.
  fn resolve_dependencies(
    &self,
    dependencies: &IndexVec<ImportRecordIdx, RawImportRecord>,
    warnings: &mut Vec<anyhow::Error>,
  ) -> BuildResult<IndexVec<ImportRecordIdx, ResolvedId>> {
    let args = self.ctx.resolve_args();
    let importer = self.resolved_id.id.as_str();

    let mut errors = vec![];
    let resolved = dependencies
      .iter()
      .map(|record| {
        match resolve_id(&args, &record.specifier, Some(importer), record.kind, false) {
          Ok(resolved) => resolved,
          Err(err) => {
            if is_bare_specifier(&record.specifier) {
              warnings.push(anyhow!("{err} from {}, treating it as external", self.debug_id()));
            } else {
              errors.push(anyhow!("{err} from {}", self.debug_id()));
            }
            ResolvedId::external(ArcStr::clone(&record.specifier))
          }
        }
      })
      .collect::<IndexVec<ImportRecordIdx, _>>();

    if !errors.is_empty() {
      Err(errors)?;
    }

    Ok(resolved)
  }

  fn with_context(&self, errs: BuildError) -> BuildError {
    let id = self.debug_id();
    errs
      .into_vec()
      .into_iter()
      .map(|err| err.context(format!("Failed to parse {id}")))
      .collect::<Vec<_>>()
      .into()
  }
}
