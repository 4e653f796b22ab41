use std::path::PathBuf;

use sugar_path::SugarPath;
use trimpack_common::{
  AnalyzeOptions, ExternalPolicy, NormalizedAnalyzeOptions, RUNTIME_ENTRY_ALIASES,
  TOOL_BINDINGS_ALIAS,
};
use trimpack_error::BuildResult;
use trimpack_utils::indexmap::{FxIndexMap, FxIndexSet};

pub fn normalize_options(raw_options: AnalyzeOptions) -> BuildResult<NormalizedAnalyzeOptions> {
  let cwd = match raw_options.cwd {
    Some(cwd) if cwd.is_absolute() => cwd.normalize(),
    Some(cwd) => std::env::current_dir()?.join(cwd).normalize(),
    None => std::env::current_dir()?,
  };

  let runtime_aliases = raw_options
    .runtime_aliases
    .unwrap_or_default()
    .into_iter()
    .map(|(specifier, path)| {
      let path = if path.is_absolute() { path } else { cwd.join(path) };
      (specifier, path.normalize())
    })
    .collect::<FxIndexMap<String, PathBuf>>();

  let ignore_list = RUNTIME_ENTRY_ALIASES
    .iter()
    .map(ToString::to_string)
    .chain(runtime_aliases.keys().cloned())
    .chain(std::iter::once(TOOL_BINDINGS_ALIAS.to_string()))
    .collect::<FxIndexSet<_>>();

  Ok(NormalizedAnalyzeOptions {
    platform: raw_options.platform.unwrap_or_default(),
    external: ExternalPolicy::new(raw_options.external.unwrap_or_default()),
    transpile_packages: raw_options.transpile_packages.unwrap_or_default(),
    runtime_aliases,
    ignore_list,
    dev: raw_options.dev.unwrap_or(false),
    cwd,
  })
}

#[test]
fn test_defaults() {
  let cwd = std::env::temp_dir().join("project");
  let options =
    normalize_options(AnalyzeOptions { cwd: Some(cwd.clone()), ..AnalyzeOptions::default() })
      .unwrap();
  assert_eq!(options.cwd, cwd);
  assert_eq!(options.platform, trimpack_common::Platform::Node);
  assert!(!options.dev);
  assert!(options.external.is_external("sharp"));
  assert!(options.is_ignored(TOOL_BINDINGS_ALIAS));
  assert!(options.is_ignored("@trimpack/runtime/server"));
  assert!(!options.is_ignored("left-pad"));
}

#[test]
fn test_runtime_aliases_are_ignored() {
  let cwd = std::env::temp_dir().join("project");
  let options = normalize_options(AnalyzeOptions {
    cwd: Some(cwd.clone()),
    runtime_aliases: Some(
      [("@acme/runtime".to_string(), PathBuf::from("shims/runtime.js"))].into_iter().collect(),
    ),
    external: Some(vec!["my-native".to_string()]),
    ..AnalyzeOptions::default()
  })
  .unwrap();
  assert_eq!(options.runtime_aliases["@acme/runtime"], cwd.join("shims").join("runtime.js"));
  assert!(options.is_ignored("@acme/runtime"));
  assert!(options.external.is_external("my-native/sub"));
}
