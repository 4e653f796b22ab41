use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use dashmap::DashMap;
use trimpack_common::PackageJson;
use trimpack_fs::FileSystem;

/// Manifests keyed by the directory holding them. Shared by all module tasks of one build.
#[derive(Debug, Default)]
pub struct PackageJsonCache {
  by_dir: DashMap<PathBuf, Option<Arc<PackageJson>>>,
}

impl PackageJsonCache {
  /// The closest `package.json` above `path`. Unreadable or malformed manifests are skipped.
  pub fn nearest(&self, fs: &dyn FileSystem, path: &Path) -> Option<Arc<PackageJson>> {
    path.ancestors().skip(1).find_map(|dir| self.load(fs, dir))
  }

  fn load(&self, fs: &dyn FileSystem, dir: &Path) -> Option<Arc<PackageJson>> {
    if let Some(cached) = self.by_dir.get(dir) {
      return cached.value().clone();
    }
    let manifest = dir.join("package.json");
    let package_json = fs
      .read_to_string(&manifest)
      .ok()
      .and_then(|source| PackageJson::parse(manifest, &source).ok())
      .map(Arc::new);
    self.by_dir.insert(dir.to_path_buf(), package_json.clone());
    package_json
  }
}
