use std::{
  fs,
  path::{Path, PathBuf},
};

use trimpack::{
  analyze_bundle_with, normalize_options, AnalyzeOptions, Bundler, DependencyExports,
  EntryAnalyzer, EntrySource, Platform, StaticArtifactLoader, WorkspaceMap,
  MODULE_RESOLVE_MAP_FILENAME,
};
use trimpack_fs::{FileSystem, OsFileSystem};
use trimpack_resolver::Resolver;

fn write(root: &Path, path: &str, content: &str) {
  let path = root.join(path);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, content).unwrap();
}

fn install(root: &Path, name: &str, index: &str) {
  write(
    root,
    &format!("node_modules/{name}/package.json"),
    &format!(r#"{{ "name": "{name}", "version": "1.0.0", "main": "index.js" }}"#),
  );
  write(root, &format!("node_modules/{name}/index.js"), index);
}

fn project() -> (tempfile::TempDir, PathBuf) {
  let dir = tempfile::tempdir().unwrap();
  let root = OsFileSystem.canonicalize(dir.path()).unwrap();
  (dir, root)
}

#[tokio::test]
async fn test_named_import_of_installed_package() {
  let (_dir, root) = project();
  install(&root, "left-pad", "export function foo(value) { return ' ' + value; }\n");
  write(
    &root,
    "a.ts",
    "import { foo } from 'left-pad';\nexport const padded: string = foo('x');\n",
  );

  let options =
    normalize_options(AnalyzeOptions { cwd: Some(root.clone()), ..AnalyzeOptions::default() })
      .unwrap();
  let resolver = Resolver::new(Platform::Node, root.clone(), OsFileSystem);
  let workspace_map = WorkspaceMap::default();
  let bundler = Bundler::new();
  let mut analyzer = EntryAnalyzer::new(&bundler, &options, &resolver, &workspace_map);

  let analysis = analyzer.analyze(&EntrySource::Path("a.ts".into())).await.unwrap();
  let metadata = &analysis.dependencies["left-pad"];
  assert_eq!(metadata.exports.to_vec(), vec!["foo"]);
  assert!(!metadata.is_workspace);
  assert_eq!(metadata.root_path.as_deref(), Some(root.join("node_modules/left-pad").as_path()));
  assert!(!analysis.transformed_source.contains(": string"));
}

#[tokio::test]
async fn test_dynamic_import_of_missing_package() {
  let (_dir, root) = project();
  write(&root, "main.js", "export const load = () => import('plugin-x');\n");

  let options =
    normalize_options(AnalyzeOptions { cwd: Some(root.clone()), ..AnalyzeOptions::default() })
      .unwrap();
  let resolver = Resolver::new(Platform::Node, root.clone(), OsFileSystem);
  let workspace_map = WorkspaceMap::default();
  let bundler = Bundler::new();
  let mut analyzer = EntryAnalyzer::new(&bundler, &options, &resolver, &workspace_map);

  let analysis = analyzer.analyze(&EntrySource::Path(root.join("main.js"))).await.unwrap();
  let metadata = &analysis.dependencies["plugin-x"];
  assert_eq!(metadata.exports, DependencyExports::All);
  assert_eq!(metadata.root_path, None);
  assert!(!metadata.is_workspace);
}

#[tokio::test]
async fn test_dynamic_import_of_installed_package() {
  let (_dir, root) = project();
  install(&root, "plugin-x", "export default function plugin() {}\n");
  write(&root, "main.js", "export const load = () => import('plugin-x');\n");

  let options =
    normalize_options(AnalyzeOptions { cwd: Some(root.clone()), ..AnalyzeOptions::default() })
      .unwrap();
  let resolver = Resolver::new(Platform::Node, root.clone(), OsFileSystem);
  let workspace_map = WorkspaceMap::default();
  let bundler = Bundler::new();
  let mut analyzer = EntryAnalyzer::new(&bundler, &options, &resolver, &workspace_map);

  let analysis = analyzer.analyze(&EntrySource::Path(root.join("main.js"))).await.unwrap();
  let metadata = &analysis.dependencies["plugin-x"];
  assert_eq!(metadata.exports, DependencyExports::All);
  assert_eq!(metadata.root_path, None);
  assert!(!metadata.is_workspace);
}

#[tokio::test]
async fn test_bindings_union_across_entries() {
  let (_dir, root) = project();
  write(&root, "a.js", "import { a } from 'pkg';\nexport const x = a;\n");
  let inline = EntrySource::Inline {
    id: "b".to_string(),
    source: "import { b } from 'pkg';\nexport const y = b;\n".to_string(),
  };

  let options =
    normalize_options(AnalyzeOptions { cwd: Some(root.clone()), ..AnalyzeOptions::default() })
      .unwrap();
  let resolver = Resolver::new(Platform::Node, root.clone(), OsFileSystem);
  let workspace_map = WorkspaceMap::default();
  let bundler = Bundler::new();
  let mut analyzer = EntryAnalyzer::new(&bundler, &options, &resolver, &workspace_map);

  analyzer.analyze(&EntrySource::Path("a.js".into())).await.unwrap();
  analyzer.analyze(&inline).await.unwrap();
  analyzer.analyze(&EntrySource::Path("a.js".into())).await.unwrap();
  assert_eq!(analyzer.dependencies()["pkg"].exports.to_vec(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_analyze_bundle() {
  let (_dir, root) = project();
  install(&root, "left-pad", "export function foo(v) { return ' ' + v; }\n");
  install(&root, "my-ext", "module.exports = { native() { return 1; } };\n");
  install(
    &root,
    "wrapper",
    "import { native } from 'my-ext';\nexport function run() { return native(); }\n",
  );
  install(&root, "needs-missing", "import 'ghost';\nglobalThis.loaded = true;\n");
  write(&root, "package.json", r#"{ "name": "app" }"#);
  write(
    &root,
    "src/main.js",
    concat!(
      "import { foo } from 'left-pad';\n",
      "import { run } from 'wrapper';\n",
      "import 'needs-missing';\n",
      "import { readFileSync } from 'node:fs';\n",
      "export const value = foo(run()) + readFileSync;\n",
    ),
  );

  let options = normalize_options(AnalyzeOptions {
    cwd: Some(root.clone()),
    external: Some(vec!["my-ext".to_string(), "ghost".to_string()]),
    ..AnalyzeOptions::default()
  })
  .unwrap();
  let loader = StaticArtifactLoader::from_options(&options);
  let main_entry = root.join("src/main.js");

  let result = analyze_bundle_with(
    &[EntrySource::Path(main_entry.clone())],
    &main_entry,
    Path::new("dist"),
    &options,
    &Bundler::new(),
    &loader,
  )
  .await
  .unwrap();

  let dist = root.join("dist");
  assert!(dist.join("deps/left-pad.js").is_file());
  assert!(dist.join("deps/wrapper.js").is_file());
  assert_eq!(result.resolved_dependency_files["left-pad"], dist.join("deps/left-pad.js"));
  assert_eq!(result.resolved_dependency_files["wrapper"], dist.join("deps/wrapper.js"));
  assert!(!result.resolved_dependency_files.contains_key("needs-missing"));
  assert!(result.demoted_external_packages.contains("needs-missing"));
  assert!(result.invalid_artifacts.contains("deps/needs-missing.js"));
  assert!(result.workspace_map.is_empty());

  let map: serde_json::Value =
    serde_json::from_str(&fs::read_to_string(dist.join(MODULE_RESOLVE_MAP_FILENAME)).unwrap())
      .unwrap();
  assert_eq!(
    map["deps/wrapper.js"]["my-ext"],
    root.join("node_modules/wrapper/index.js").to_string_lossy().into_owned()
  );
  assert_eq!(
    map["deps/needs-missing.js"]["ghost"],
    root.join("node_modules/needs-missing/index.js").to_string_lossy().into_owned()
  );
  assert!(map.get("deps/left-pad.js").is_none());
}

#[cfg(unix)]
#[tokio::test]
async fn test_analyze_bundle_in_workspace() {
  let (_dir, root) = project();
  write(&root, "package.json", r#"{ "private": true, "workspaces": ["packages/*"] }"#);
  write(
    &root,
    "packages/app/package.json",
    r#"{ "name": "app", "dependencies": { "@acme/ui": "*" } }"#,
  );
  write(
    &root,
    "packages/app/src/main.ts",
    "import { button } from '@acme/ui';\nexport const ui = button;\n",
  );
  write(&root, "packages/ui/package.json", r#"{ "name": "@acme/ui", "main": "index.ts" }"#);
  write(&root, "packages/ui/index.ts", "export const button: string = 'button';\n");
  let scope_dir = root.join("packages/app/node_modules/@acme");
  fs::create_dir_all(&scope_dir).unwrap();
  std::os::unix::fs::symlink(root.join("packages/ui"), scope_dir.join("ui")).unwrap();

  let app = root.join("packages/app");
  let options = normalize_options(AnalyzeOptions {
    cwd: Some(app.clone()),
    dev: Some(true),
    ..AnalyzeOptions::default()
  })
  .unwrap();
  let loader = StaticArtifactLoader::from_options(&options);
  let main_entry = app.join("src/main.ts");

  let result = analyze_bundle_with(
    &[EntrySource::Path(main_entry.clone())],
    &main_entry,
    &app.join("dist"),
    &options,
    &Bundler::new(),
    &loader,
  )
  .await
  .unwrap();

  assert_eq!(result.workspace_map.keys().collect::<Vec<_>>(), vec!["app", "@acme/ui"]);
  let cached = root.join("packages/ui/.trimpack/deps/@acme+ui.js");
  assert!(cached.is_file());
  assert!(!fs::read_to_string(&cached).unwrap().contains(": string"));
  assert_eq!(result.resolved_dependency_files["@acme/ui"], cached);
}
