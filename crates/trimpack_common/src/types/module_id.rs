use std::path::Path;

use arcstr::ArcStr;
use trimpack_utils::path_ext::PathExt;

use crate::VIRTUAL_MODULE_PREFIX;

/// `ModuleId` is the unique string identifier for each module.
/// - An absolute path for modules on disk.
/// - `\0virtual:<name>` for modules served from memory.
/// - The specifier itself for external modules.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct ModuleId(ArcStr);

impl ModuleId {
  pub fn new(value: impl Into<ArcStr>) -> Self {
    Self(value.into())
  }

  pub fn is_virtual(&self) -> bool {
    self.0.starts_with(VIRTUAL_MODULE_PREFIX)
  }

  /// Registry key of the module: cwd-relative with `/` separators for paths on disk, unchanged
  /// for virtual ids.
  pub fn stabilize(&self, cwd: &Path) -> String {
    let path = Path::new(self.0.as_str());
    if path.is_absolute() { path.relative_slash(cwd) } else { self.0.to_string() }
  }

  pub fn inner(&self) -> &ArcStr {
    &self.0
  }
}

impl std::ops::Deref for ModuleId {
  type Target = str;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl AsRef<str> for ModuleId {
  fn as_ref(&self) -> &str {
    self
  }
}

impl std::fmt::Display for ModuleId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<ArcStr> for ModuleId {
  fn from(value: ArcStr) -> Self {
    Self::new(value)
  }
}

impl From<&str> for ModuleId {
  fn from(value: &str) -> Self {
    Self::new(value)
  }
}

#[test]
fn test_stabilize() {
  let cwd = std::env::temp_dir().join("project");
  let id = ModuleId::new(cwd.join("src").join("main.js").to_string_lossy().into_owned());
  assert_eq!(id.stabilize(&cwd), "src/main.js");

  let id = ModuleId::new(arcstr::format!("{VIRTUAL_MODULE_PREFIX}deps/left-pad"));
  assert!(id.is_virtual());
  assert_eq!(id.stabilize(&cwd), "\0virtual:deps/left-pad");
}
