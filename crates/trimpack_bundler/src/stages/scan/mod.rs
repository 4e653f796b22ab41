use arcstr::ArcStr;
use trimpack_common::{ImportKind, ResolvedId};
use trimpack_error::BuildResult;
use trimpack_fs::OsFileSystem;

use crate::{
  module_loader::{ModuleLoader, ModuleLoaderOutput},
  types::{SharedOptions, SharedResolver},
  utils::{
    package_json_cache::PackageJsonCache,
    resolve_id::{resolve_id, ResolveIdArgs},
  },
};

pub type ScanStageOutput = ModuleLoaderOutput;

pub struct ScanStage {
  fs: OsFileSystem,
  options: SharedOptions,
  resolver: SharedResolver,
}

impl ScanStage {
  pub fn new(fs: OsFileSystem, options: SharedOptions, resolver: SharedResolver) -> Self {
    Self { fs, options, resolver }
  }

  pub async fn scan(&mut self) -> BuildResult<ScanStageOutput> {
    if self.options.input.is_empty() {
      Err(vec![anyhow::anyhow!("You must supply options.input to trimpack")])?;
    }

    let package_json_cache = PackageJsonCache::default();
    let user_entries = self.resolve_user_defined_entries(&package_json_cache)?;

    let module_loader = ModuleLoader::new(
      self.fs,
      SharedOptions::clone(&self.options),
      SharedResolver::clone(&self.resolver),
      package_json_cache,
    );

    module_loader.fetch_all_modules(user_entries).await
  }

  fn resolve_user_defined_entries(
    &self,
    package_json_cache: &PackageJsonCache,
  ) -> BuildResult<Vec<(Option<ArcStr>, ResolvedId)>> {
    let args = ResolveIdArgs {
      fs: &self.fs,
      options: &self.options,
      resolver: &self.resolver,
      package_json_cache,
    };

    let mut ret = Vec::with_capacity(self.options.input.len());
    let mut errors = vec![];

    for input_item in &self.options.input {
      match resolve_id(&args, &input_item.import, None, ImportKind::Import, true) {
        Ok(info) if info.is_external => {
          errors.push(anyhow::anyhow!(
            "Failed to resolve {:?} - entry can't be external",
            info.id.to_string()
          ));
        }
        Ok(info) => ret.push((input_item.name.as_deref().map(ArcStr::from), info)),
        Err(e) => errors.push(anyhow::anyhow!("ResolveError: {e}")),
      }
    }

    if !errors.is_empty() {
      Err(errors)?;
    }

    Ok(ret)
  }
}
