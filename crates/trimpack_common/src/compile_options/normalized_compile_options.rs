use std::path::{Path, PathBuf};

use trimpack_utils::{indexmap::FxIndexMap, path_ext::PathExt};

use crate::{ExternalOption, InputItem, Platform};

#[allow(clippy::struct_excessive_bools)] // Using raw booleans is more clear in this case
#[derive(Debug)]
pub struct NormalizedCompileOptions {
  // --- Input
  pub input: Vec<InputItem>,
  pub cwd: PathBuf,
  pub platform: Platform,
  pub virtual_modules: FxIndexMap<String, String>,

  // --- Resolve
  pub alias: Vec<(String, PathBuf)>,
  pub external: Option<ExternalOption>,
  pub transform_include: Vec<PathBuf>,

  // --- Tree shaking
  pub treeshake: bool,

  // --- Output
  /// Absolute.
  pub dir: PathBuf,
  pub entry_filenames: String,
  pub chunk_filenames: String,
  pub asset_filenames: String,
  pub inline_dynamic_imports: bool,
  pub write: bool,
}

impl NormalizedCompileOptions {
  pub fn is_external(&self, specifier: &str) -> bool {
    self.external.as_ref().is_some_and(|external| external.is_external(specifier))
  }

  /// Sources outside `node_modules` are always transformed. Installed ones only under an include
  /// root.
  pub fn is_in_transform_scope(&self, path: &Path) -> bool {
    !path.is_in_node_modules() || self.transform_include.iter().any(|root| path.starts_with(root))
  }
}
