use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleType {
  Js,
  Jsx,
  Ts,
  Tsx,
  Json,
  /// Anything that is not code. Emitted as a file and imported as its URL.
  Asset,
}

impl ModuleType {
  pub fn from_path(path: &Path) -> Self {
    match path.extension().and_then(|ext| ext.to_str()) {
      None | Some("js" | "mjs" | "cjs") => Self::Js,
      Some("jsx") => Self::Jsx,
      Some("ts" | "mts" | "cts") => Self::Ts,
      Some("tsx") => Self::Tsx,
      Some("json") => Self::Json,
      Some(_) => Self::Asset,
    }
  }

  /// Needs TypeScript or JSX stripped before it can be scanned.
  pub fn needs_transform(self) -> bool {
    matches!(self, Self::Jsx | Self::Ts | Self::Tsx)
  }
}

#[test]
fn test_from_path() {
  assert_eq!(ModuleType::from_path(Path::new("/a/index.mjs")), ModuleType::Js);
  assert_eq!(ModuleType::from_path(Path::new("/a/bin/cli")), ModuleType::Js);
  assert_eq!(ModuleType::from_path(Path::new("/a/App.tsx")), ModuleType::Tsx);
  assert_eq!(ModuleType::from_path(Path::new("/a/data.json")), ModuleType::Json);
  assert_eq!(ModuleType::from_path(Path::new("/a/logo.png")), ModuleType::Asset);
}
