use trimpack_utils::{indexmap::FxIndexSet, package_name::matches_package};

/// Packages that load native bindings or ship their own binaries. Bundling them breaks them.
pub const DEFAULT_ALWAYS_EXTERNAL: &[&str] = &[
  "sharp",
  "canvas",
  "bcrypt",
  "argon2",
  "sqlite3",
  "better-sqlite3",
  "bufferutil",
  "utf-8-validate",
  "fsevents",
  "esbuild",
  "@swc/core",
  "lightningcss",
  "playwright-core",
  "puppeteer",
  "@prisma/client",
  "prisma",
];

/// Packages left for the runtime to resolve. Built once per pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalPolicy {
  pub always: FxIndexSet<String>,
  pub custom: FxIndexSet<String>,
}

impl ExternalPolicy {
  pub fn new(custom: impl IntoIterator<Item = String>) -> Self {
    Self {
      always: DEFAULT_ALWAYS_EXTERNAL.iter().map(ToString::to_string).collect(),
      custom: custom.into_iter().collect(),
    }
  }

  pub fn is_external(&self, specifier: &str) -> bool {
    self.always.iter().chain(&self.custom).any(|name| matches_package(specifier, name))
  }

  pub fn all(&self) -> Vec<String> {
    let custom = self.custom.iter().filter(|name| !self.always.contains(*name));
    self.always.iter().chain(custom).cloned().collect()
  }
}

#[test]
fn test_external_policy() {
  let policy = ExternalPolicy::new(["my-native".to_string(), "sharp".to_string()]);
  assert!(policy.is_external("sharp"));
  assert!(policy.is_external("@prisma/client/runtime"));
  assert!(policy.is_external("my-native"));
  assert!(!policy.is_external("left-pad"));
  assert_eq!(policy.all().len(), DEFAULT_ALWAYS_EXTERNAL.len() + 1);
}
