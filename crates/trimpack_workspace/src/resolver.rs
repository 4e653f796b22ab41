use std::path::{Path, PathBuf};

use sugar_path::SugarPath;
use trimpack_common::WorkspaceMap;
use trimpack_error::BuildResult;
use trimpack_fs::{FileSystem, OsFileSystem};

use crate::discovery::discover_workspace;

#[derive(Debug, Default)]
pub struct WorkspaceResolution {
  /// Empty unless the package being built is a member of the workspace.
  pub workspace_map: WorkspaceMap,
  pub workspace_root: Option<PathBuf>,
  pub is_workspace_package: bool,
}

#[derive(Debug, Default)]
pub struct WorkspaceResolver<F: FileSystem = OsFileSystem> {
  fs: F,
}

impl<F: FileSystem> WorkspaceResolver<F> {
  pub fn new(fs: F) -> Self {
    Self { fs }
  }

  /// A workspace found above `start_dir` only counts when its package list contains the package
  /// `start_dir` belongs to.
  #[tracing::instrument(level = "debug", skip(self))]
  pub fn resolve(&self, start_dir: &Path) -> BuildResult<WorkspaceResolution> {
    let Some(package_root) = self.find_package_root(start_dir) else {
      tracing::debug!("no package.json above the start directory");
      return Ok(WorkspaceResolution::default());
    };
    let Some(workspace) = discover_workspace(&self.fs, start_dir)? else {
      return Ok(WorkspaceResolution::default());
    };

    let package_root = self.comparable(&package_root);
    let is_member =
      workspace.packages.values().any(|info| self.comparable(&info.location) == package_root);
    if !is_member {
      tracing::debug!(
        root = %workspace.root.display(),
        package = %package_root.display(),
        "package is not a member of the workspace"
      );
      return Ok(WorkspaceResolution::default());
    }

    Ok(WorkspaceResolution {
      workspace_map: workspace.packages,
      workspace_root: Some(workspace.root),
      is_workspace_package: true,
    })
  }

  fn find_package_root(&self, start_dir: &Path) -> Option<PathBuf> {
    start_dir
      .ancestors()
      .find(|dir| self.fs.is_file(&dir.join("package.json")))
      .map(Path::to_path_buf)
  }

  fn comparable(&self, path: &Path) -> PathBuf {
    self.fs.canonicalize(path).unwrap_or_else(|_| path.normalize())
  }
}

#[cfg(test)]
use std::fs;

#[cfg(test)]
fn write(root: &Path, path: &str, content: &str) {
  let path = root.join(path);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, content).unwrap();
}

#[cfg(test)]
fn fixture() -> tempfile::TempDir {
  let dir = tempfile::tempdir().unwrap();
  let root = dir.path();
  write(
    root,
    "package.json",
    r#"{ "private": true, "workspaces": ["packages/*", "!packages/legacy"] }"#,
  );
  write(root, "packages/app/package.json", r#"{ "name": "app", "dependencies": { "ui": "*" } }"#);
  write(root, "packages/app/src/index.ts", "");
  write(root, "packages/ui/package.json", r#"{ "name": "ui", "version": "0.1.0" }"#);
  write(root, "packages/legacy/package.json", r#"{ "name": "legacy" }"#);
  dir
}

#[test]
fn test_member_package() {
  let dir = fixture();
  let resolution =
    WorkspaceResolver::new(OsFileSystem).resolve(&dir.path().join("packages/app/src")).unwrap();
  assert!(resolution.is_workspace_package);
  assert_eq!(resolution.workspace_root.as_deref(), Some(dir.path()));
  assert_eq!(resolution.workspace_map.keys().collect::<Vec<_>>(), vec!["app", "ui"]);
}

#[test]
fn test_excluded_package() {
  let dir = fixture();
  let resolution =
    WorkspaceResolver::new(OsFileSystem).resolve(&dir.path().join("packages/legacy")).unwrap();
  assert!(!resolution.is_workspace_package);
  assert!(resolution.workspace_root.is_none());
  assert!(resolution.workspace_map.is_empty());
}

#[test]
fn test_workspace_root_is_not_a_member() {
  let dir = fixture();
  let resolution = WorkspaceResolver::new(OsFileSystem).resolve(dir.path()).unwrap();
  assert!(!resolution.is_workspace_package);
  assert!(resolution.workspace_map.is_empty());
}
