use std::{borrow::Cow, path::Path};

use sugar_path::SugarPath;

pub trait PathExt {
  /// `self` relative to `base`, with `/` separators on every platform.
  fn relative_slash(&self, base: &Path) -> String;

  /// Name used for chunks and bindings derived from this module. Not guaranteed to be a valid
  /// identifier.
  fn representative_file_name(&self) -> Cow<str>;

  /// `true` when any component of the path is a `node_modules` directory.
  fn is_in_node_modules(&self) -> bool;
}

impl PathExt for Path {
  fn relative_slash(&self, base: &Path) -> String {
    self.relative(base).to_slash_lossy().into_owned()
  }

  fn representative_file_name(&self) -> Cow<str> {
    let stem =
      self.file_stem().map_or_else(|| self.to_string_lossy(), |stem| stem.to_string_lossy());
    // `src/button/index.js` and Deno's `src/button/mod.ts` are both named after `button`.
    if matches!(stem.as_ref(), "index" | "mod") {
      if let Some(dir) = self.parent().and_then(Path::file_name) {
        return dir.to_string_lossy();
      }
    }
    stem
  }

  fn is_in_node_modules(&self) -> bool {
    self.components().any(|component| component.as_os_str() == "node_modules")
  }
}

#[test]
fn test_representative_file_name() {
  let project = Path::new(".").join("project");
  assert_eq!(project.join("src").join("vue.js").representative_file_name(), "vue");
  assert_eq!(project.join("vue").join("index.js").representative_file_name(), "vue");
  assert_eq!(project.join("vue").join("mod.ts").representative_file_name(), "vue");
  assert_eq!(Path::new("index.js").representative_file_name(), "index");
}

#[test]
fn test_relative_slash() {
  let root = Path::new("/app");
  assert_eq!(root.join("packages").join("ui").relative_slash(root), "packages/ui");
  assert_eq!(root.relative_slash(&root.join("dist")), "..");
}

#[test]
fn test_is_in_node_modules() {
  assert!(Path::new("/app/node_modules/left-pad/index.js").is_in_node_modules());
  assert!(!Path::new("/app/packages/node_modules_like/index.js").is_in_node_modules());
}
