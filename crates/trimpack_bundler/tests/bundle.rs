use std::{fs, path::Path};

use trimpack_bundler::{Bundler, CompileOptions, ExternalOption, InputItem, Output, OutputChunk};

fn write(root: &Path, path: &str, content: &str) {
  let path = root.join(path);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, content).unwrap();
}

fn chunks(outputs: &[Output]) -> Vec<&OutputChunk> {
  outputs.iter().filter_map(Output::as_chunk).collect()
}

#[tokio::test]
async fn test_imported_bindings_of_externals() {
  let dir = tempfile::tempdir().unwrap();
  write(dir.path(), "src/a.js", "import { foo } from 'left-pad';\nexport const padded = foo('x');\n");

  let output = Bundler::new()
    .build(CompileOptions {
      input: Some(vec![InputItem::named("main", "./src/a.js")]),
      cwd: Some(dir.path().to_path_buf()),
      external: Some(ExternalOption::BareSpecifiers),
      inline_dynamic_imports: Some(true),
      ..CompileOptions::default()
    })
    .await
    .unwrap();

  let chunks = chunks(&output.outputs);
  assert_eq!(chunks.len(), 1);
  let chunk = chunks[0];
  assert_eq!(chunk.filename.as_str(), "main.js");
  assert!(chunk.is_static_entry());
  assert_eq!(chunk.imports, vec!["left-pad".to_string()]);
  assert_eq!(chunk.imported_bindings.get("left-pad"), Some(&vec!["foo".to_string()]));
  assert_eq!(chunk.exports, vec!["padded".to_string()]);
  assert!(chunk.code.contains("import * as __trimpack_ext_0 from \"left-pad\";"));
  assert!(chunk.code.contains("export { __trimpack_export_0 as padded };"));
}

#[tokio::test]
async fn test_dynamic_import_of_external() {
  let dir = tempfile::tempdir().unwrap();
  write(dir.path(), "main.js", "export const load = () => import('plugin-x');\n");

  let output = Bundler::new()
    .build(CompileOptions {
      input: Some(vec!["./main.js".into()]),
      cwd: Some(dir.path().to_path_buf()),
      external: Some(ExternalOption::BareSpecifiers),
      inline_dynamic_imports: Some(true),
      ..CompileOptions::default()
    })
    .await
    .unwrap();

  let chunk = chunks(&output.outputs)[0];
  assert_eq!(chunk.dynamic_imports, vec!["plugin-x".to_string()]);
  assert!(chunk.imported_bindings.is_empty());
  assert!(chunk.code.contains("import('plugin-x')"));
}

#[tokio::test]
async fn test_shared_chunk_for_two_entries() {
  let dir = tempfile::tempdir().unwrap();
  write(dir.path(), "shared.js", "export const shared = 1;\n");
  write(dir.path(), "a.js", "import { shared } from './shared.js';\nexport const a = shared;\n");
  write(dir.path(), "b.js", "import { shared } from './shared.js';\nexport const b = shared;\n");

  let output = Bundler::new()
    .build(CompileOptions {
      input: Some(vec![InputItem::named("a", "./a.js"), InputItem::named("b", "./b.js")]),
      cwd: Some(dir.path().to_path_buf()),
      write: Some(true),
      ..CompileOptions::default()
    })
    .await
    .unwrap();

  let chunks = chunks(&output.outputs);
  assert_eq!(chunks.len(), 3);
  let shared = chunks.iter().find(|chunk| !chunk.is_entry).unwrap();
  assert!(shared.filename.starts_with("chunks/shared-"));
  assert!(shared.filename.ends_with(".js"));
  assert!(shared.code.contains("export { __trimpack_modules };"));
  for entry in chunks.iter().filter(|chunk| chunk.is_entry) {
    assert_eq!(entry.imports, vec![shared.filename.to_string()]);
    assert!(entry.code.contains(&format!("from \"./{}\"", shared.filename)));
    assert!(!entry.code.contains("export { __trimpack_modules"));
    assert!(!entry.code.contains("export { __trimpack_load"));
  }
  assert!(dir.path().join("dist").join(shared.filename.as_str()).is_file());
  assert!(dir.path().join("dist/a.js").is_file());
}

#[tokio::test]
async fn test_only_dynamic_entries_export_the_loader() {
  let dir = tempfile::tempdir().unwrap();
  write(dir.path(), "page.js", "export const page = 1;\n");
  write(dir.path(), "main.js", "export const load = () => import('./page.js');\n");

  let output = Bundler::new()
    .build(CompileOptions {
      input: Some(vec![InputItem::named("main", "./main.js")]),
      cwd: Some(dir.path().to_path_buf()),
      ..CompileOptions::default()
    })
    .await
    .unwrap();

  let chunks = chunks(&output.outputs);
  assert_eq!(chunks.len(), 2);
  let main = chunks.iter().find(|chunk| chunk.is_entry).unwrap();
  let page = chunks.iter().find(|chunk| chunk.is_dynamic_entry).unwrap();
  assert_eq!(main.dynamic_imports, vec![page.filename.to_string()]);
  assert!(main.code.contains("export { __trimpack_export_0 as load };"));
  assert!(!main.code.contains("export { __trimpack_modules"));
  assert!(!main.code.contains("export { __trimpack_load"));
  assert!(page.code.contains("export { __trimpack_load };"));
}

#[tokio::test]
async fn test_side_effect_free_import_is_dropped() {
  let dir = tempfile::tempdir().unwrap();
  write(
    dir.path(),
    "node_modules/pure/package.json",
    r#"{ "name": "pure", "main": "index.js", "sideEffects": false }"#,
  );
  write(dir.path(), "node_modules/pure/index.js", "export const unused = 1;\n");
  write(
    dir.path(),
    "node_modules/effectful/package.json",
    r#"{ "name": "effectful", "main": "index.js" }"#,
  );
  write(dir.path(), "node_modules/effectful/index.js", "globalThis.touched = true;\n");
  write(dir.path(), "main.js", "import { unused } from 'pure';\nimport 'effectful';\n");

  let output = Bundler::new()
    .build(CompileOptions {
      input: Some(vec!["./main.js".into()]),
      cwd: Some(dir.path().to_path_buf()),
      ..CompileOptions::default()
    })
    .await
    .unwrap();

  let chunk = chunks(&output.outputs)[0];
  let ids = chunk.module_ids.iter().map(|id| id.to_string()).collect::<Vec<_>>();
  assert!(ids.iter().all(|id| !id.contains("node_modules/pure")));
  assert!(ids.iter().any(|id| id.contains("node_modules/effectful")));
  assert!(ids.last().unwrap().ends_with("main.js"));
}

#[tokio::test]
async fn test_virtual_entry_reexports() {
  let dir = tempfile::tempdir().unwrap();
  write(
    dir.path(),
    "node_modules/left-pad/package.json",
    r#"{ "name": "left-pad", "main": "index.js" }"#,
  );
  write(
    dir.path(),
    "node_modules/left-pad/index.js",
    "module.exports = function pad() {};\nmodule.exports.foo = 1;\n",
  );

  let id = trimpack_bundler::virtual_module_id("deps/left-pad");
  let output = Bundler::new()
    .build(CompileOptions {
      input: Some(vec![InputItem::named("deps/left-pad", id.clone())]),
      cwd: Some(dir.path().to_path_buf()),
      virtual_modules: Some(
        [(id.clone(), "export { foo, default } from 'left-pad';\n".to_string())]
          .into_iter()
          .collect(),
      ),
      ..CompileOptions::default()
    })
    .await
    .unwrap();

  let chunk = chunks(&output.outputs)[0];
  assert_eq!(chunk.filename.as_str(), "deps/left-pad.js");
  assert_eq!(chunk.exports, vec!["foo".to_string(), "default".to_string()]);
  let ids = chunk.module_ids.iter().map(|id| id.to_string()).collect::<Vec<_>>();
  assert_eq!(ids.len(), 2);
  assert!(ids[0].ends_with("index.js"));
  assert_eq!(ids[1], id);
}

#[tokio::test]
async fn test_unresolved_relative_import_is_an_error() {
  let dir = tempfile::tempdir().unwrap();
  write(dir.path(), "main.js", "import './missing.js';\n");

  let err = Bundler::new()
    .build(CompileOptions {
      input: Some(vec!["./main.js".into()]),
      cwd: Some(dir.path().to_path_buf()),
      ..CompileOptions::default()
    })
    .await
    .unwrap_err();

  assert!(err.to_string().contains("missing.js"));
}

#[tokio::test]
async fn test_empty_input_is_rejected() {
  let err = Bundler::new().build(CompileOptions::default()).await.unwrap_err();
  assert!(err.to_string().contains("You must supply options.input"));
}
