use std::path::PathBuf;

use trimpack_utils::indexmap::{FxIndexMap, FxIndexSet};

use crate::{ExternalPolicy, Platform};

#[derive(Debug)]
pub struct NormalizedAnalyzeOptions {
  pub cwd: PathBuf,
  pub platform: Platform,
  pub external: ExternalPolicy,
  pub transpile_packages: Vec<String>,
  pub runtime_aliases: FxIndexMap<String, PathBuf>,
  /// Specifiers never recorded as dependencies: the runtime entries and the tool bindings.
  pub ignore_list: FxIndexSet<String>,
  pub dev: bool,
}

impl NormalizedAnalyzeOptions {
  pub fn is_ignored(&self, specifier: &str) -> bool {
    self.ignore_list.contains(specifier)
  }
}
