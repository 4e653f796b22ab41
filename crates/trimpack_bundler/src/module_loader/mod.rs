pub mod ast_scanner;
mod module_task;
pub mod render_module;
pub mod task_context;

use std::sync::Arc;

use arcstr::ArcStr;
use module_task::ModuleTask;
use oxc_index::IndexVec;
use rustc_hash::{FxHashMap, FxHashSet};
use task_context::TaskContext;
use tokio::sync::mpsc::Receiver;
use trimpack_common::{
  EntryPoint, EntryPointKind, ExternalModule, ImportKind, ImportRecordIdx, Module, ModuleIdx,
  NormalModule, RawImportRecord, ResolvedId, DUMMY_MODULE_IDX,
};
use trimpack_error::BuildResult;
use trimpack_fs::OsFileSystem;

use crate::{
  types::{IndexModules, SharedOptions, SharedResolver},
  utils::package_json_cache::PackageJsonCache,
};

pub struct NormalModuleTaskResult {
  pub module: NormalModule,
  pub raw_import_records: IndexVec<ImportRecordIdx, RawImportRecord>,
  pub resolved_deps: IndexVec<ImportRecordIdx, ResolvedId>,
  pub warnings: Vec<anyhow::Error>,
}

pub enum ModuleLoaderMsg {
  NormalModuleDone(Box<NormalModuleTaskResult>),
  BuildErrors(Vec<anyhow::Error>),
}

pub struct ModuleLoader {
  rx: Receiver<ModuleLoaderMsg>,
  remaining: u32,
  shared_context: Arc<TaskContext>,
  modules: IndexVec<ModuleIdx, Option<Module>>,
  visited: FxHashMap<ArcStr, ModuleIdx>,
}

pub struct ModuleLoaderOutput {
  // Stored all modules
  pub module_table: IndexModules,
  // Entries that user defined + dynamic import entries
  pub entry_points: Vec<EntryPoint>,
  pub warnings: Vec<anyhow::Error>,
}

impl ModuleLoader {
  pub fn new(
    fs: OsFileSystem,
    options: SharedOptions,
    resolver: SharedResolver,
    package_json_cache: PackageJsonCache,
  ) -> Self {
    // 1024 should be enough for most cases
    // over 1024 pending tasks are insane
    let (tx, rx) = tokio::sync::mpsc::channel(1024);

    let shared_context =
      Arc::new(TaskContext { fs, options, resolver, package_json_cache, tx });

    Self {
      rx,
      remaining: 0,
      shared_context,
      modules: IndexVec::new(),
      visited: FxHashMap::default(),
    }
  }

  fn try_spawn_new_task(
    &mut self,
    resolved_id: ResolvedId,
    owner: Option<String>,
    is_user_defined_entry: bool,
  ) -> ModuleIdx {
    if let Some(idx) = self.visited.get(&resolved_id.id) {
      return *idx;
    }

    let idx = self.modules.push(None);
    self.visited.insert(ArcStr::clone(&resolved_id.id), idx);

    if resolved_id.is_external {
      self.modules[idx] = Some(ExternalModule::new(idx, resolved_id.id).into());
    } else {
      self.remaining += 1;
      let task = ModuleTask::new(
        Arc::clone(&self.shared_context),
        idx,
        owner,
        resolved_id,
        is_user_defined_entry,
      );
      tokio::spawn(task.run());
    }

    idx
  }

  pub async fn fetch_all_modules(
    mut self,
    user_defined_entries: Vec<(Option<ArcStr>, ResolvedId)>,
  ) -> BuildResult<ModuleLoaderOutput> {
    let mut entry_points = user_defined_entries
      .into_iter()
      .map(|(name, info)| EntryPoint {
        name,
        idx: self.try_spawn_new_task(info, None, true),
        kind: EntryPointKind::UserDefined,
      })
      .collect::<Vec<_>>();

    let user_defined_entry_ids =
      entry_points.iter().map(|entry| entry.idx).collect::<FxHashSet<_>>();
    let mut dynamic_import_entry_ids = FxHashSet::default();

    let mut errors = vec![];
    let mut all_warnings = vec![];

    while self.remaining > 0 {
      let Some(msg) = self.rx.recv().await else {
        break;
      };
      match msg {
        ModuleLoaderMsg::NormalModuleDone(task_result) => {
          let NormalModuleTaskResult { mut module, raw_import_records, resolved_deps, warnings } =
            *task_result;
          all_warnings.extend(warnings);

          let import_records = raw_import_records
            .into_iter()
            .zip(resolved_deps)
            .map(|(raw_rec, info)| {
              if raw_rec.is_dropped() {
                return raw_rec.into_resolved(DUMMY_MODULE_IDX);
              }
              let is_dynamic_target =
                matches!(raw_rec.kind, ImportKind::DynamicImport) && !info.is_external;
              let id = self.try_spawn_new_task(info, Some(module.stable_id.clone()), false);
              if is_dynamic_target && !user_defined_entry_ids.contains(&id) {
                dynamic_import_entry_ids.insert(id);
              }
              raw_rec.into_resolved(id)
            })
            .collect::<IndexVec<ImportRecordIdx, _>>();

          module.import_records = import_records;
          let idx = module.idx;
          self.modules[idx] = Some(module.into());
          self.remaining -= 1;
        }
        ModuleLoaderMsg::BuildErrors(e) => {
          errors.extend(e);
          self.remaining -= 1;
        }
      }
    }

    if !errors.is_empty() {
      Err(errors)?;
    }

    let module_table = self
      .modules
      .into_iter()
      .enumerate()
      .map(|(idx, module)| {
        module.ok_or_else(|| anyhow::anyhow!("Module #{idx} was never loaded"))
      })
      .collect::<anyhow::Result<IndexModules>>()?;

    let mut dynamic_import_entry_ids = dynamic_import_entry_ids.into_iter().collect::<Vec<_>>();
    dynamic_import_entry_ids.sort_unstable_by_key(|id| module_table[*id].stable_id().to_string());

    entry_points.extend(dynamic_import_entry_ids.into_iter().map(|id| EntryPoint {
      name: None,
      idx: id,
      kind: EntryPointKind::DynamicImport,
    }));

    Ok(ModuleLoaderOutput { module_table, entry_points, warnings: all_warnings })
  }
}
