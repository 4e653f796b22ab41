use std::path::{Path, PathBuf};

use serde::Deserialize;
use trimpack_utils::{indexmap::FxIndexMap, path_ext::PathExt};

/// The parts of a `package.json` the pipeline reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
  #[serde(skip)]
  pub path: PathBuf,
  pub name: Option<String>,
  pub version: Option<String>,
  pub workspaces: Option<Workspaces>,
  pub side_effects: Option<SideEffects>,
  #[serde(default)]
  pub dependencies: FxIndexMap<String, String>,
  #[serde(default)]
  pub dev_dependencies: FxIndexMap<String, String>,
  #[serde(default)]
  pub peer_dependencies: FxIndexMap<String, String>,
  #[serde(default)]
  pub optional_dependencies: FxIndexMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Workspaces {
  Packages(Vec<String>),
  Detailed {
    #[serde(default)]
    packages: Vec<String>,
  },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SideEffects {
  Bool(bool),
  Glob(String),
  Globs(Vec<String>),
}

impl PackageJson {
  pub fn parse(path: PathBuf, source: &str) -> anyhow::Result<Self> {
    let mut package_json: Self = serde_json::from_str(source)
      .map_err(|err| anyhow::anyhow!("Invalid manifest {}: {err}", path.display()))?;
    package_json.path = path;
    Ok(package_json)
  }

  pub fn dir(&self) -> &Path {
    self.path.parent().unwrap_or(&self.path)
  }

  pub fn workspace_patterns(&self) -> Option<&[String]> {
    match self.workspaces.as_ref()? {
      Workspaces::Packages(packages) | Workspaces::Detailed { packages } => Some(packages),
    }
  }

  /// Every declared dependency regardless of its kind. `None` when the manifest declares none.
  pub fn all_dependencies(&self) -> Option<FxIndexMap<String, String>> {
    let merged = self
      .dependencies
      .iter()
      .chain(&self.dev_dependencies)
      .chain(&self.peer_dependencies)
      .chain(&self.optional_dependencies)
      .fold(FxIndexMap::default(), |mut acc, (name, range)| {
        acc.entry(name.clone()).or_insert_with(|| range.clone());
        acc
      });
    (!merged.is_empty()).then_some(merged)
  }

  /// Whether evaluating `module_path` may have side effects according to the `sideEffects` field.
  /// Missing field means it may.
  pub fn has_side_effects(&self, module_path: &Path) -> bool {
    let globs = match &self.side_effects {
      None => return true,
      Some(SideEffects::Bool(value)) => return *value,
      Some(SideEffects::Glob(glob)) => std::slice::from_ref(glob),
      Some(SideEffects::Globs(globs)) => globs.as_slice(),
    };
    let relative = module_path.relative_slash(self.dir());
    globs.iter().any(|glob| {
      let glob = glob.strip_prefix("./").unwrap_or(glob);
      if glob.contains('/') {
        fast_glob::glob_match(glob, &relative)
      } else {
        fast_glob::glob_match(&format!("**/{glob}"), &relative)
      }
    })
  }
}

#[test]
fn test_side_effects_field() {
  let root = std::env::temp_dir().join("node_modules").join("pkg");
  let manifest = root.join("package.json");

  let pkg = PackageJson::parse(manifest.clone(), r#"{ "name": "pkg" }"#).unwrap();
  assert!(pkg.has_side_effects(&root.join("index.js")));

  let pkg = PackageJson::parse(manifest.clone(), r#"{ "sideEffects": false }"#).unwrap();
  assert!(!pkg.has_side_effects(&root.join("index.js")));

  let pkg =
    PackageJson::parse(manifest, r#"{ "sideEffects": ["./src/polyfill.js", "*.css"] }"#).unwrap();
  assert!(pkg.has_side_effects(&root.join("src").join("polyfill.js")));
  assert!(pkg.has_side_effects(&root.join("dist").join("style.css")));
  assert!(!pkg.has_side_effects(&root.join("src").join("index.js")));
}

#[test]
fn test_workspaces_field() {
  let path = PathBuf::from("package.json");
  let pkg = PackageJson::parse(path.clone(), r#"{ "workspaces": ["packages/*"] }"#).unwrap();
  assert_eq!(pkg.workspace_patterns(), Some(&["packages/*".to_string()][..]));

  let pkg =
    PackageJson::parse(path.clone(), r#"{ "workspaces": { "packages": ["apps/*"] } }"#).unwrap();
  assert_eq!(pkg.workspace_patterns(), Some(&["apps/*".to_string()][..]));

  let pkg = PackageJson::parse(path, r#"{ "name": "solo" }"#).unwrap();
  assert!(pkg.workspace_patterns().is_none());
  assert!(pkg.all_dependencies().is_none());
}

#[test]
fn test_all_dependencies() {
  let pkg = PackageJson::parse(
    PathBuf::from("package.json"),
    r#"{ "dependencies": { "a": "^1.0.0" }, "devDependencies": { "b": "2" }, "peerDependencies": { "a": "*" } }"#,
  )
  .unwrap();
  let deps = pkg.all_dependencies().unwrap();
  assert_eq!(deps.len(), 2);
  assert_eq!(deps["a"], "^1.0.0");
  assert_eq!(deps["b"], "2");
}
