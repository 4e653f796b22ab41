pub mod external_option;
pub mod filename_template;
pub mod input_item;
pub mod normalized_compile_options;
pub mod platform;

use std::path::PathBuf;

use trimpack_utils::indexmap::FxIndexMap;

use crate::{ExternalOption, InputItem, Platform};

#[derive(Default, Debug, Clone)]
pub struct CompileOptions {
  // --- Input
  pub input: Option<Vec<InputItem>>,
  pub cwd: Option<PathBuf>,
  pub platform: Option<Platform>,
  /// Module id -> source. Ids are expected to carry the `\0virtual:` prefix.
  pub virtual_modules: Option<FxIndexMap<String, String>>,

  // --- Resolve
  /// Specifier -> file. Checked before any other resolution.
  pub alias: Option<Vec<(String, PathBuf)>>,
  pub external: Option<ExternalOption>,
  /// Installed packages under these roots get TypeScript and JSX stripped like local sources.
  pub transform_include: Option<Vec<PathBuf>>,

  // --- Tree shaking
  pub treeshake: Option<bool>,

  // --- Output
  pub dir: Option<PathBuf>,
  pub entry_filenames: Option<String>,
  pub chunk_filenames: Option<String>,
  pub asset_filenames: Option<String>,
  pub inline_dynamic_imports: Option<bool>,
  pub write: Option<bool>,
}
