use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use sugar_path::SugarPath;
use trimpack_common::{PackageJson, WorkspaceMap, WorkspacePackageInfo};
use trimpack_error::BuildResult;
use trimpack_fs::FileSystem;
use trimpack_utils::path_ext::PathExt;

const PNPM_WORKSPACE_FILE: &str = "pnpm-workspace.yaml";

#[derive(Debug)]
pub struct DiscoveredWorkspace {
  /// Directory holding the workspace definition.
  pub root: PathBuf,
  pub packages: WorkspaceMap,
}

#[derive(Deserialize)]
struct PnpmWorkspace {
  #[serde(default)]
  packages: Vec<String>,
}

/// Walks up from `start_dir` to the first directory defining a workspace, either through the
/// `workspaces` field of its `package.json` or a `pnpm-workspace.yaml`.
pub fn discover_workspace(
  fs: &dyn FileSystem,
  start_dir: &Path,
) -> BuildResult<Option<DiscoveredWorkspace>> {
  for dir in start_dir.ancestors() {
    let Some(patterns) = read_workspace_patterns(fs, dir)? else {
      continue;
    };
    let packages = expand_workspace_patterns(fs, dir, &patterns)?;
    tracing::debug!(root = %dir.display(), packages = packages.len(), "discovered workspace");
    return Ok(Some(DiscoveredWorkspace { root: dir.to_path_buf(), packages }));
  }
  Ok(None)
}

fn read_workspace_patterns(fs: &dyn FileSystem, dir: &Path) -> BuildResult<Option<Vec<String>>> {
  let pnpm_workspace = dir.join(PNPM_WORKSPACE_FILE);
  if fs.is_file(&pnpm_workspace) {
    let source = fs.read_to_string(&pnpm_workspace)?;
    let workspace: PnpmWorkspace = serde_yaml::from_str(&source)
      .with_context(|| format!("Invalid {}", pnpm_workspace.display()))?;
    return Ok(Some(workspace.packages));
  }

  let manifest = dir.join("package.json");
  if !fs.is_file(&manifest) {
    return Ok(None);
  }
  let source = fs.read_to_string(&manifest)?;
  let package_json = PackageJson::parse(manifest, &source)?;
  Ok(package_json.workspace_patterns().map(<[String]>::to_vec))
}

fn is_glob_segment(segment: &str) -> bool {
  segment.contains(['*', '?', '[', '{'])
}

fn is_ignored_dir(path: &Path) -> bool {
  path
    .file_name()
    .map(|name| name.to_string_lossy())
    .is_some_and(|name| name == "node_modules" || name.starts_with('.'))
}

fn sub_dirs(fs: &dyn FileSystem, dir: &Path) -> Vec<PathBuf> {
  fs.read_dir(dir)
    .unwrap_or_default()
    .into_iter()
    .filter(|path| fs.is_dir(path) && !is_ignored_dir(path))
    .collect()
}

/// `dir` and every directory below it.
fn descendant_dirs(fs: &dyn FileSystem, dir: &Path) -> Vec<PathBuf> {
  let mut ret = vec![dir.to_path_buf()];
  let mut idx = 0;
  while idx < ret.len() {
    let children = sub_dirs(fs, &ret[idx]);
    ret.extend(children);
    idx += 1;
  }
  ret
}

/// Matches a pattern one path segment at a time, so only directories that can still match are
/// read.
fn expand_pattern(fs: &dyn FileSystem, root: &Path, pattern: &str) -> Vec<PathBuf> {
  let mut candidates = vec![root.to_path_buf()];
  for segment in pattern.split('/').filter(|segment| !segment.is_empty() && *segment != ".") {
    candidates = candidates
      .iter()
      .flat_map(|dir| {
        if segment == "**" {
          descendant_dirs(fs, dir)
        } else if is_glob_segment(segment) {
          sub_dirs(fs, dir)
            .into_iter()
            .filter(|path| {
              path
                .file_name()
                .is_some_and(|name| fast_glob::glob_match(segment, name.to_string_lossy().as_ref()))
            })
            .collect()
        } else {
          let path = dir.join(segment);
          if fs.is_dir(&path) { vec![path] } else { vec![] }
        }
      })
      .collect();
  }
  candidates
}

fn expand_workspace_patterns(
  fs: &dyn FileSystem,
  root: &Path,
  patterns: &[String],
) -> BuildResult<WorkspaceMap> {
  let normalize = |pattern: &str| {
    let pattern = pattern.trim();
    pattern.strip_prefix("./").unwrap_or(pattern).trim_end_matches('/').to_string()
  };
  let negations = patterns
    .iter()
    .filter_map(|pattern| pattern.strip_prefix('!'))
    .map(normalize)
    .collect::<Vec<_>>();

  let mut packages = WorkspaceMap::default();
  for pattern in patterns.iter().filter(|pattern| !pattern.starts_with('!')) {
    for dir in expand_pattern(fs, root, &normalize(pattern)) {
      let relative = dir.relative_slash(root);
      if negations.iter().any(|negation| fast_glob::glob_match(negation, &relative)) {
        continue;
      }

      let manifest = dir.join("package.json");
      if !fs.is_file(&manifest) {
        continue;
      }
      let source = fs.read_to_string(&manifest)?;
      let package_json = PackageJson::parse(manifest, &source)?;
      let Some(name) = package_json.name.clone() else {
        continue;
      };
      packages.entry(name).or_insert_with(|| WorkspacePackageInfo {
        location: dir.normalize(),
        dependencies: package_json.all_dependencies(),
        version: package_json.version.clone(),
      });
    }
  }
  Ok(packages)
}

#[cfg(test)]
use std::fs;
#[cfg(test)]
use trimpack_fs::OsFileSystem;

#[cfg(test)]
fn write(root: &Path, path: &str, content: &str) {
  let path = root.join(path);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, content).unwrap();
}

#[test]
fn test_package_json_workspaces() {
  let dir = tempfile::tempdir().unwrap();
  let root = dir.path();
  write(root, "package.json", r#"{ "workspaces": ["packages/*", "!packages/skipped"] }"#);
  write(
    root,
    "packages/a/package.json",
    r#"{ "name": "a", "version": "1.0.0", "dependencies": { "b": "workspace:*" } }"#,
  );
  write(root, "packages/b/package.json", r#"{ "name": "b" }"#);
  write(root, "packages/skipped/package.json", r#"{ "name": "skipped" }"#);
  write(root, "packages/no-manifest/index.js", "");

  let workspace = discover_workspace(&OsFileSystem, &root.join("packages/a")).unwrap().unwrap();
  assert_eq!(workspace.root, root);
  assert_eq!(workspace.packages.keys().collect::<Vec<_>>(), vec!["a", "b"]);
  let a = &workspace.packages["a"];
  assert_eq!(a.version.as_deref(), Some("1.0.0"));
  assert_eq!(a.dependencies.as_ref().unwrap()["b"], "workspace:*");
  assert!(workspace.packages["b"].dependencies.is_none());
}

#[test]
fn test_pnpm_workspace() {
  let dir = tempfile::tempdir().unwrap();
  let root = dir.path();
  write(root, "pnpm-workspace.yaml", "packages:\n  - 'apps/**'\n");
  write(root, "apps/web/package.json", r#"{ "name": "web" }"#);
  write(root, "apps/tools/cli/package.json", r#"{ "name": "cli" }"#);
  write(root, "apps/web/node_modules/dep/package.json", r#"{ "name": "dep" }"#);

  let workspace = discover_workspace(&OsFileSystem, root).unwrap().unwrap();
  let mut names = workspace.packages.keys().cloned().collect::<Vec<_>>();
  names.sort();
  assert_eq!(names, vec!["cli", "web"]);
}

#[test]
fn test_no_workspace() {
  let dir = tempfile::tempdir().unwrap();
  write(dir.path(), "app/package.json", r#"{ "name": "app" }"#);
  let start = dir.path().join("app");
  // Directories above the temp dir are outside our control, so only check the fixture part.
  if let Some(workspace) = discover_workspace(&OsFileSystem, &start).unwrap() {
    assert!(!workspace.root.starts_with(dir.path()));
  }
}

#[test]
fn test_malformed_manifest_is_an_error() {
  let dir = tempfile::tempdir().unwrap();
  write(dir.path(), "package.json", "{ not json");
  assert!(discover_workspace(&OsFileSystem, dir.path()).is_err());
}
