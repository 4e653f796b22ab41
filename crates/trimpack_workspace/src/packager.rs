use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use futures::future::try_join_all;
use trimpack_common::{WorkspaceMap, WorkspacePackageInfo};
use trimpack_error::BuildResult;
use trimpack_fs::{FileSystem, OsFileSystem};
use trimpack_utils::{indexmap::FxIndexMap, sanitize_file_name::flatten_package_name};

use crate::transitive::collect_transitive_workspace_dependencies;

/// Packages packed concurrently. A batch starts once the previous one settled.
pub const PACK_BATCH_SIZE: usize = 5;

/// Turns a workspace package into something deployable, returning where it ended up.
#[async_trait]
pub trait WorkspacePackager: Send + Sync {
  async fn pack(
    &self,
    name: &str,
    info: &WorkspacePackageInfo,
    destination: &Path,
  ) -> anyhow::Result<PathBuf>;
}

/// Packs `names` and their transitive workspace dependencies into `destination`.
#[tracing::instrument(level = "debug", skip_all, fields(destination = %destination.display()))]
pub async fn pack_workspace_dependencies<S: AsRef<str>>(
  packager: &dyn WorkspacePackager,
  names: &[S],
  workspace_map: &WorkspaceMap,
  destination: &Path,
) -> BuildResult<FxIndexMap<String, PathBuf>> {
  let packages = collect_transitive_workspace_dependencies(names, workspace_map)
    .into_iter()
    .filter_map(|name| workspace_map.get(&name).map(|info| (name, info)))
    .collect::<Vec<_>>();

  let mut packed = FxIndexMap::default();
  for batch in packages.chunks(PACK_BATCH_SIZE) {
    let results = try_join_all(batch.iter().map(|(name, info)| async move {
      let location = packager
        .pack(name, info, destination)
        .await
        .with_context(|| format!("Failed to pack workspace package {name}"))?;
      anyhow::Ok((name.clone(), location))
    }))
    .await?;
    tracing::debug!(packed = results.len(), "packed batch");
    packed.extend(results);
  }
  Ok(packed)
}

/// Copies the package directory, without `node_modules` and dot-directories.
#[derive(Debug, Default)]
pub struct DirectoryPackager<F: FileSystem = OsFileSystem> {
  fs: F,
}

impl<F: FileSystem> DirectoryPackager<F> {
  pub fn new(fs: F) -> Self {
    Self { fs }
  }

  fn copy_dir(&self, from: &Path, to: &Path) -> anyhow::Result<()> {
    self.fs.create_dir_all(to)?;
    for entry in self.fs.read_dir(from)? {
      let Some(file_name) = entry.file_name() else {
        continue;
      };
      if self.fs.is_dir(&entry) {
        let name = file_name.to_string_lossy();
        if name == "node_modules" || name.starts_with('.') {
          continue;
        }
        self.copy_dir(&entry, &to.join(file_name))?;
      } else {
        let content =
          self.fs.read(&entry).with_context(|| format!("Failed to read {}", entry.display()))?;
        self.fs.write(&to.join(file_name), &content)?;
      }
    }
    Ok(())
  }
}

#[async_trait]
impl<F: FileSystem> WorkspacePackager for DirectoryPackager<F> {
  async fn pack(
    &self,
    name: &str,
    info: &WorkspacePackageInfo,
    destination: &Path,
  ) -> anyhow::Result<PathBuf> {
    let target = destination.join(flatten_package_name(name));
    self.copy_dir(&info.location, &target)?;
    tracing::debug!(name, target = %target.display(), "packed workspace package");
    Ok(target)
  }
}

#[cfg(test)]
use std::{
  fs,
  sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
  },
  time::Duration,
};

#[cfg(test)]
fn package(location: PathBuf, deps: &[&str]) -> WorkspacePackageInfo {
  WorkspacePackageInfo {
    location,
    dependencies: (!deps.is_empty())
      .then(|| deps.iter().map(|dep| ((*dep).to_string(), "*".to_string())).collect()),
    version: None,
  }
}

#[cfg(test)]
#[derive(Default)]
struct RecordingPackager {
  running: AtomicUsize,
  max_running: AtomicUsize,
  packed: Mutex<Vec<String>>,
}

#[cfg(test)]
#[async_trait]
impl WorkspacePackager for RecordingPackager {
  async fn pack(
    &self,
    name: &str,
    _info: &WorkspacePackageInfo,
    destination: &Path,
  ) -> anyhow::Result<PathBuf> {
    let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
    self.max_running.fetch_max(running, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(5)).await;
    self.running.fetch_sub(1, Ordering::SeqCst);
    if name == "broken" {
      anyhow::bail!("no build script");
    }
    self.packed.lock().unwrap().push(name.to_string());
    Ok(destination.join(name))
  }
}

#[cfg(test)]
#[tokio::test]
async fn test_packs_in_batches() {
  let mut map = WorkspaceMap::default();
  let deps = (0..7).map(|idx| format!("lib-{idx}")).collect::<Vec<_>>();
  map.insert(
    "app".to_string(),
    package(PathBuf::from("/repo/app"), &deps.iter().map(String::as_str).collect::<Vec<_>>()),
  );
  for dep in &deps {
    map.insert(dep.clone(), package(PathBuf::from("/repo").join(dep), &[]));
  }

  let packager = RecordingPackager::default();
  let packed =
    pack_workspace_dependencies(&packager, &["app"], &map, Path::new("/out")).await.unwrap();
  assert_eq!(packed.len(), 8);
  assert_eq!(packed["lib-3"], Path::new("/out/lib-3"));
  assert!(packager.max_running.load(Ordering::SeqCst) <= PACK_BATCH_SIZE);
  assert_eq!(packager.packed.lock().unwrap().len(), 8);
}

#[cfg(test)]
#[tokio::test]
async fn test_failure_aborts() {
  let mut map = WorkspaceMap::default();
  map.insert("app".to_string(), package(PathBuf::from("/repo/app"), &["broken"]));
  map.insert("broken".to_string(), package(PathBuf::from("/repo/broken"), &[]));

  let packager = RecordingPackager::default();
  let err = pack_workspace_dependencies(&packager, &["app"], &map, Path::new("/out"))
    .await
    .unwrap_err();
  assert!(err.to_string().contains("Failed to pack workspace package broken"));
}

#[cfg(test)]
#[tokio::test]
async fn test_directory_packager() {
  let dir = tempfile::tempdir().unwrap();
  let source = dir.path().join("packages/ui");
  fs::create_dir_all(source.join("src")).unwrap();
  fs::create_dir_all(source.join("node_modules/dep")).unwrap();
  fs::create_dir_all(source.join(".turbo")).unwrap();
  fs::write(source.join("package.json"), r#"{ "name": "@acme/ui" }"#).unwrap();
  fs::write(source.join("src/index.js"), "export const ui = 1;").unwrap();
  fs::write(source.join("node_modules/dep/index.js"), "").unwrap();
  fs::write(source.join(".turbo/log"), "").unwrap();

  let destination = dir.path().join("out");
  let target = DirectoryPackager::new(OsFileSystem)
    .pack("@acme/ui", &package(source, &[]), &destination)
    .await
    .unwrap();
  assert_eq!(target, destination.join("@acme+ui"));
  assert!(target.join("package.json").is_file());
  assert_eq!(fs::read_to_string(target.join("src/index.js")).unwrap(), "export const ui = 1;");
  assert!(!target.join("node_modules").exists());
  assert!(!target.join(".turbo").exists());
}
