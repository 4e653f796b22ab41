use trimpack_fs::OsFileSystem;

use crate::{
  types::{SharedOptions, SharedResolver},
  utils::{package_json_cache::PackageJsonCache, resolve_id::ResolveIdArgs},
};

use super::ModuleLoaderMsg;

/// Used to store common data shared between all tasks.
pub struct TaskContext {
  pub fs: OsFileSystem,
  pub options: SharedOptions,
  pub resolver: SharedResolver,
  pub package_json_cache: PackageJsonCache,
  pub tx: tokio::sync::mpsc::Sender<ModuleLoaderMsg>,
}

impl TaskContext {
  pub fn resolve_args(&self) -> ResolveIdArgs<'_> {
    ResolveIdArgs {
      fs: &self.fs,
      options: &self.options,
      resolver: &self.resolver,
      package_json_cache: &self.package_json_cache,
    }
  }
}
