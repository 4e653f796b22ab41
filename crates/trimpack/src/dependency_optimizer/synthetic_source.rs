use trimpack_common::DependencyExports;
use trimpack_utils::{
  concat_string,
  ecmascript::{js_string, to_module_import_export_name},
};

/// Source of the module standing in for `package`: it re-exports exactly `exports`. An empty
/// binding set only keeps the package's side effects.
pub fn synthesize_source(package: &str, exports: &DependencyExports) -> String {
  let source = js_string(package);
  match exports {
    DependencyExports::All => concat_string!("export * from ", source, ";\n"),
    DependencyExports::Named(names) if names.is_empty() => concat_string!("import ", source, ";\n"),
    DependencyExports::Named(names) => {
      let specifiers =
        names.iter().map(|name| to_module_import_export_name(name)).collect::<Vec<_>>();
      concat_string!("export { ", specifiers.join(", "), " } from ", source, ";\n")
    }
  }
}

#[test]
fn test_synthesize_source() {
  assert_eq!(
    synthesize_source("plugin-x", &DependencyExports::All),
    "export * from \"plugin-x\";\n"
  );
  assert_eq!(
    synthesize_source("polyfill", &DependencyExports::default()),
    "import \"polyfill\";\n"
  );
  assert_eq!(
    synthesize_source(
      "left-pad",
      &DependencyExports::from(vec!["foo".to_string(), "default".to_string(), "a-b".to_string()])
    ),
    "export { foo, default, \"a-b\" } from \"left-pad\";\n"
  );
}
