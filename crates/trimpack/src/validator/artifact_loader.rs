use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use rustc_hash::FxHashSet;
use sugar_path::SugarPath;
use trimpack_common::{ImportKind, ModuleType, NormalizedAnalyzeOptions};
use trimpack_ecmascript::{source_type_for, EcmaCompiler};
use trimpack_fs::{FileSystem, OsFileSystem};
use trimpack_resolver::Resolver;
use trimpack_utils::{indexmap::FxIndexSet, node_builtins::is_builtin_module};

/// Checks that a produced artifact can be loaded at runtime.
#[async_trait]
pub trait ArtifactLoader: Send + Sync {
  async fn load(&self, path: &Path) -> anyhow::Result<()>;
}

/// Loads an ES module graph without evaluating it: every file must parse, relative imports must
/// point to files that load as well and bare imports must be builtins or resolvable from the
/// importing file.
pub struct StaticArtifactLoader<F: FileSystem + Default = OsFileSystem> {
  fs: F,
  resolver: Resolver<F>,
  /// Specifiers the runtime provides by itself.
  provided: FxIndexSet<String>,
}

impl StaticArtifactLoader {
  /// Resolves packages the way the analyzed program does and trusts the runtime-provided
  /// specifiers.
  pub fn from_options(options: &NormalizedAnalyzeOptions) -> Self {
    let resolver = Resolver::new(options.platform, options.cwd.clone(), OsFileSystem);
    Self::new(OsFileSystem, resolver, options.ignore_list.clone())
  }
}

impl<F: FileSystem + Default> StaticArtifactLoader<F> {
  pub fn new(fs: F, resolver: Resolver<F>, provided: FxIndexSet<String>) -> Self {
    Self { fs, resolver, provided }
  }

  fn load_module(&self, path: &Path, visited: &mut FxHashSet<PathBuf>) -> anyhow::Result<()> {
    if !visited.insert(path.to_path_buf()) {
      return Ok(());
    }
    let source =
      self.fs.read_to_string(path).with_context(|| format!("Cannot find {}", path.display()))?;
    let source_type = source_type_for(ModuleType::from_path(path), path);
    let imports = EcmaCompiler::static_imports(&source, source_type)
      .map_err(|errors| anyhow::anyhow!("{errors}"))
      .with_context(|| format!("Failed to parse {}", path.display()))?;

    let dir = path.parent().unwrap_or(path);
    for specifier in imports {
      if specifier.starts_with("./") || specifier.starts_with("../") {
        let target = dir.join(&specifier).normalize();
        if !self.fs.is_file(&target) {
          anyhow::bail!("{} imports missing file {specifier:?}", path.display());
        }
        self.load_module(&target, visited)?;
      } else if !self.is_provided(&specifier) {
        self
          .resolver
          .resolve(Some(path), &specifier, ImportKind::Import, false)
          .map_err(|err| anyhow::anyhow!("Cannot find package {specifier:?}: {err}"))
          .with_context(|| format!("Failed to load {}", path.display()))?;
      }
    }
    Ok(())
  }

  fn is_provided(&self, specifier: &str) -> bool {
    is_builtin_module(specifier) || self.provided.contains(specifier)
  }
}

#[async_trait]
impl<F: FileSystem + Default> ArtifactLoader for StaticArtifactLoader<F> {
  async fn load(&self, path: &Path) -> anyhow::Result<()> {
    let mut visited = FxHashSet::default();
    self.load_module(path, &mut visited)
  }
}

#[cfg(test)]
use std::fs;
#[cfg(test)]
use trimpack_common::Platform;

#[cfg(test)]
fn loader(root: &Path) -> StaticArtifactLoader {
  let resolver = Resolver::new(Platform::Node, root.to_path_buf(), OsFileSystem);
  let provided = std::iter::once("@trimpack/tools".to_string()).collect();
  StaticArtifactLoader::new(OsFileSystem, resolver, provided)
}

#[cfg(test)]
fn write(root: &Path, path: &str, content: &str) {
  let path = root.join(path);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, content).unwrap();
}

#[cfg(test)]
#[tokio::test]
async fn test_loads_graph() {
  let dir = tempfile::tempdir().unwrap();
  let root = dir.path();
  write(root, "node_modules/ext/package.json", r#"{ "name": "ext", "main": "index.js" }"#);
  write(root, "node_modules/ext/index.js", "module.exports = 1;");
  write(
    root,
    "dist/deps/a.js",
    concat!(
      "import { x } from '../chunks/x.js';\n",
      "import 'node:fs';\n",
      "import 'ext';\n",
      "import '@trimpack/tools';\n",
      "export { x };\n",
    ),
  );
  write(root, "dist/chunks/x.js", "import './y.js';\nexport const x = 1;\n");
  write(root, "dist/chunks/y.js", "import './x.js';\n");

  loader(root).load(&root.join("dist/deps/a.js")).await.unwrap();
}

#[cfg(test)]
#[tokio::test]
async fn test_failures() {
  let dir = tempfile::tempdir().unwrap();
  let root = dir.path();
  write(root, "dist/missing-chunk.js", "import './chunks/gone.js';\n");
  write(root, "dist/missing-package.js", "export * from 'not-installed';\n");
  write(root, "dist/broken.js", "export const = ;\n");

  let loader = loader(root);
  assert!(loader.load(&root.join("dist/missing-chunk.js")).await.is_err());
  assert!(loader.load(&root.join("dist/missing-package.js")).await.is_err());
  assert!(loader.load(&root.join("dist/broken.js")).await.is_err());
  assert!(loader.load(&root.join("dist/nowhere.js")).await.is_err());
}
