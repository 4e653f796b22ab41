use std::path::{Path, PathBuf};

use arcstr::ArcStr;
use dashmap::DashMap;
use itertools::Itertools;
use sugar_path::SugarPath;

use oxc_resolver::{ResolveError, ResolveOptions as OxcResolverOptions, Resolver as OxcResolver};

use trimpack_common::{ImportKind, Platform};
use trimpack_fs::{FileSystem, OsFileSystem};

#[derive(Debug)]
pub struct Resolver<F: FileSystem + Default = OsFileSystem> {
  cwd: PathBuf,
  fs: F,
  import_resolver: OxcResolver,
  require_resolver: OxcResolver,
  /// (package name, lookup dir) -> package root
  package_root_cache: DashMap<(String, PathBuf), Option<PathBuf>>,
}

impl<F: FileSystem + Default> Resolver<F> {
  pub fn new(platform: Platform, cwd: PathBuf, fs: F) -> Self {
    let mut default_conditions = vec!["default".to_string()];

    match platform {
      Platform::Node => {
        default_conditions.push("node".to_string());
      }
      Platform::Browser => {
        default_conditions.push("browser".to_string());
      }
      Platform::Neutral => {}
    }

    let import_conditions =
      std::iter::once("import".to_string()).chain(default_conditions.clone()).unique().collect();
    let require_conditions =
      std::iter::once("require".to_string()).chain(default_conditions).unique().collect();

    let main_fields = match platform {
      Platform::Node => {
        vec!["main".to_string(), "module".to_string()]
      }
      Platform::Browser => vec!["browser".to_string(), "module".to_string(), "main".to_string()],
      Platform::Neutral => vec!["module".to_string(), "main".to_string()],
    };

    let alias_fields = match platform {
      Platform::Browser => vec![vec!["browser".to_string()]],
      _ => vec![],
    };

    let builtin_modules = match platform {
      Platform::Node => true,
      Platform::Browser | Platform::Neutral => false,
    };

    let resolve_options_with_import_conditions = OxcResolverOptions {
      main_fields,
      alias_fields,
      builtin_modules,
      condition_names: import_conditions,
      extensions: [".js", ".mjs", ".cjs", ".jsx", ".ts", ".mts", ".cts", ".tsx", ".json"]
        .into_iter()
        .map(String::from)
        .collect(),
      extension_alias: vec![(
        ".js".to_string(),
        vec![".js".to_string(), ".ts".to_string(), ".tsx".to_string()],
      )],
      ..Default::default()
    };

    let resolve_options_with_require_conditions = OxcResolverOptions {
      condition_names: require_conditions,
      ..resolve_options_with_import_conditions.clone()
    };

    let import_resolver = OxcResolver::new(resolve_options_with_import_conditions);
    let require_resolver =
      import_resolver.clone_with_options(resolve_options_with_require_conditions);

    Self { cwd, fs, import_resolver, require_resolver, package_root_cache: DashMap::default() }
  }

  pub fn cwd(&self) -> &PathBuf {
    &self.cwd
  }
}

#[derive(Debug)]
pub struct ResolveReturn {
  pub path: ArcStr,
}

impl<F: FileSystem + Default> Resolver<F> {
  pub fn resolve(
    &self,
    importer: Option<&Path>,
    specifier: &str,
    kind: ImportKind,
    is_user_defined_entry: bool,
  ) -> Result<ResolveReturn, ResolveError> {
    let resolver = match kind {
      ImportKind::Require => &self.require_resolver,
      ImportKind::Import | ImportKind::DynamicImport => &self.import_resolver,
    };

    let dir = importer
      .and_then(|importer| importer.parent())
      .filter(|inner| inner.components().next().is_some())
      .unwrap_or(self.cwd.as_path());

    let mut resolution = resolver.resolve(dir, specifier);

    // Handle `{ input: 'main' }` -> `<CWD>/main.{js,ts}`
    if resolution.is_err() && is_user_defined_entry {
      let is_specifier_path_like = specifier.starts_with('.') || specifier.starts_with('/');
      if !is_specifier_path_like {
        let normalized_specifier = self.cwd.join(specifier).normalize();
        let result = resolver.resolve(dir, &normalized_specifier.to_string_lossy());
        if result.is_ok() {
          resolution = result;
        }
      }
    }

    resolution.map(|info| ResolveReturn { path: info.full_path().to_string_lossy().into() })
  }

  /// The installation root of package `name` as seen from `from_dir`. A miss is `None`, never an
  /// error.
  pub fn package_root(&self, name: &str, from_dir: &Path) -> Option<PathBuf> {
    let key = (name.to_string(), from_dir.to_path_buf());
    if let Some(cached) = self.package_root_cache.get(&key) {
      return cached.value().clone();
    }
    let root = self
      .package_root_from_resolution(name, from_dir)
      .or_else(|| self.package_root_from_node_modules(name, from_dir));
    self.package_root_cache.insert(key, root.clone());
    root
  }

  fn package_root_from_resolution(&self, name: &str, from_dir: &Path) -> Option<PathBuf> {
    let resolution = self
      .import_resolver
      .resolve(from_dir, name)
      .or_else(|_| self.require_resolver.resolve(from_dir, name))
      .ok()?;
    let resolved = resolution.full_path();
    resolved
      .ancestors()
      .skip(1)
      .find(|dir| self.manifest_name(dir).as_deref() == Some(name))
      .map(Path::to_path_buf)
  }

  fn package_root_from_node_modules(&self, name: &str, from_dir: &Path) -> Option<PathBuf> {
    from_dir.ancestors().find_map(|dir| {
      let candidate = dir.join("node_modules").join(name);
      self
        .fs
        .is_file(&candidate.join("package.json"))
        .then(|| self.fs.canonicalize(&candidate).unwrap_or(candidate))
    })
  }

  fn manifest_name(&self, dir: &Path) -> Option<String> {
    let source = self.fs.read_to_string(&dir.join("package.json")).ok()?;
    let manifest: serde_json::Value = serde_json::from_str(&source).ok()?;
    manifest.get("name")?.as_str().map(ToString::to_string)
  }
}

#[cfg(test)]
fn write_package(root: &Path, name: &str, main: &str) {
  let dir = root.join("node_modules").join(name);
  std::fs::create_dir_all(&dir).unwrap();
  std::fs::write(
    dir.join("package.json"),
    format!(r#"{{ "name": "{name}", "version": "1.0.0", "main": "{main}" }}"#),
  )
  .unwrap();
  let main = dir.join(main);
  std::fs::create_dir_all(main.parent().unwrap()).unwrap();
  std::fs::write(main, "module.exports = 1;").unwrap();
}

#[test]
fn test_package_root() {
  let temp = tempfile::tempdir().unwrap();
  let root = OsFileSystem.canonicalize(temp.path()).unwrap();
  write_package(&root, "left-pad", "lib/index.js");
  write_package(&root, "@scope/pkg", "index.js");
  let src = root.join("src");
  std::fs::create_dir_all(&src).unwrap();

  let resolver = Resolver::new(Platform::Node, root.clone(), OsFileSystem);
  assert_eq!(
    resolver.package_root("left-pad", &src),
    Some(root.join("node_modules").join("left-pad"))
  );
  assert_eq!(
    resolver.package_root("@scope/pkg", &src),
    Some(root.join("node_modules").join("@scope").join("pkg"))
  );
  assert_eq!(resolver.package_root("plugin-x", &src), None);
}

#[test]
fn test_resolve_relative() {
  let temp = tempfile::tempdir().unwrap();
  let root = OsFileSystem.canonicalize(temp.path()).unwrap();
  std::fs::write(root.join("util.ts"), "export const a = 1;").unwrap();
  std::fs::write(root.join("main.ts"), "import { a } from './util.js';").unwrap();

  let resolver = Resolver::new(Platform::Node, root.clone(), OsFileSystem);
  let ret =
    resolver.resolve(Some(&root.join("main.ts")), "./util.js", ImportKind::Import, false).unwrap();
  assert_eq!(ret.path.as_str(), root.join("util.ts").to_string_lossy());
}
