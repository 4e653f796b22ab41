use trimpack_utils::package_name::{is_bare_specifier, matches_package};

/// Which specifiers are left for the runtime to resolve instead of being bundled.
#[derive(Debug, Clone)]
pub enum ExternalOption {
  /// Every bare specifier, i.e. everything that would be looked up in `node_modules`.
  BareSpecifiers,
  /// These packages, including their subpaths.
  Packages(Vec<String>),
}

impl ExternalOption {
  pub fn is_external(&self, specifier: &str) -> bool {
    match self {
      Self::BareSpecifiers => is_bare_specifier(specifier),
      Self::Packages(packages) => {
        packages.iter().any(|package| matches_package(specifier, package))
      }
    }
  }
}

#[test]
fn test_is_external() {
  assert!(ExternalOption::BareSpecifiers.is_external("left-pad"));
  assert!(!ExternalOption::BareSpecifiers.is_external("./left-pad"));

  let option = ExternalOption::Packages(vec!["sharp".to_string()]);
  assert!(option.is_external("sharp/lib/index.js"));
  assert!(!option.is_external("left-pad"));
}
