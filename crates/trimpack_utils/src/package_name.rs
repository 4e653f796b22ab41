/// A specifier that goes through `node_modules` lookup: not relative, not absolute, not a URL.
pub fn is_bare_specifier(specifier: &str) -> bool {
  !(specifier.is_empty()
    || specifier.starts_with('.')
    || specifier.starts_with('/')
    || specifier.starts_with('\\')
    || specifier.starts_with('\0')
    || specifier.starts_with('#')
    || specifier.contains(':')
    || is_windows_absolute(specifier))
}

fn is_windows_absolute(specifier: &str) -> bool {
  let bytes = specifier.as_bytes();
  bytes.len() > 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// The installable package a bare specifier points into.
/// `@scope/pkg/sub/path` -> `@scope/pkg`, `lodash/fp` -> `lodash`.
pub fn package_name_of(specifier: &str) -> Option<&str> {
  if !is_bare_specifier(specifier) {
    return None;
  }
  let mut segments = specifier.match_indices('/').map(|(idx, _)| idx);
  let end = if specifier.starts_with('@') {
    segments.nth(1)
  } else {
    segments.next()
  };
  Some(end.map_or(specifier, |end| &specifier[..end]))
}

/// The identity a demoted dependency is recorded under. Scoped names keep their first two
/// segments, anything else is kept as written.
pub fn dependency_identity(dependency: &str) -> &str {
  if dependency.starts_with('@') {
    let end = dependency.match_indices('/').nth(1).map_or(dependency.len(), |(idx, _)| idx);
    &dependency[..end]
  } else {
    dependency
  }
}

/// `true` when `specifier` is `name` itself or a subpath of it.
pub fn matches_package(specifier: &str, name: &str) -> bool {
  specifier == name
    || (specifier.len() > name.len()
      && specifier.starts_with(name)
      && specifier.as_bytes()[name.len()] == b'/')
}

#[test]
fn test_package_name_of() {
  assert_eq!(package_name_of("left-pad"), Some("left-pad"));
  assert_eq!(package_name_of("lodash/fp"), Some("lodash"));
  assert_eq!(package_name_of("@scope/pkg"), Some("@scope/pkg"));
  assert_eq!(package_name_of("@scope/pkg/sub/path"), Some("@scope/pkg"));
  assert_eq!(package_name_of("./local"), None);
  assert_eq!(package_name_of("/abs/path"), None);
  assert_eq!(package_name_of("node:fs"), None);
  assert_eq!(package_name_of("C:\\abs"), None);
}

#[test]
fn test_dependency_identity() {
  assert_eq!(dependency_identity("@scope/pkg/sub"), "@scope/pkg");
  assert_eq!(dependency_identity("@scope/pkg"), "@scope/pkg");
  assert_eq!(dependency_identity("lodash/fp"), "lodash/fp");
}

#[test]
fn test_matches_package() {
  assert!(matches_package("sharp", "sharp"));
  assert!(matches_package("sharp/lib/index.js", "sharp"));
  assert!(!matches_package("sharpie", "sharp"));
}
