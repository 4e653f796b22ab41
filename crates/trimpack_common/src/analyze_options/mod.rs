pub mod external_policy;
pub mod normalized_analyze_options;

use std::path::PathBuf;

use serde::Deserialize;
use trimpack_utils::indexmap::FxIndexMap;

use crate::Platform;

/// Raw pipeline options, as read from a `trimpack.json` config file or built by an embedder.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AnalyzeOptions {
  pub cwd: Option<PathBuf>,
  pub platform: Option<Platform>,
  /// Packages that are never bundled, on top of the built-in always-external list.
  pub external: Option<Vec<String>>,
  /// Installed packages whose sources get TypeScript and JSX stripped.
  pub transpile_packages: Option<Vec<String>>,
  /// Runtime entry specifier -> file it resolves to while analyzing.
  pub runtime_aliases: Option<FxIndexMap<String, PathBuf>>,
  pub dev: Option<bool>,
}
