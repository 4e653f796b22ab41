pub fn sanitize_file_name(str: &str) -> String {
  let mut sanitized = String::with_capacity(str.len());
  for char in str.chars() {
    if char.is_ascii_alphanumeric() || matches!(char, '-' | '_' | '.') {
      sanitized.push(char);
    } else {
      sanitized.push('_');
    }
  }
  sanitized
}

/// Turns a package specifier into a single path segment, `@scope/pkg/sub` -> `@scope+pkg+sub`.
/// Same convention as the `.pnpm` store directory names.
pub fn flatten_package_name(specifier: &str) -> String {
  specifier.replace(['/', '\\'], "+")
}

#[test]
fn test_sanitize_file_name() {
  assert_eq!(sanitize_file_name("\0+a=Z_0-"), "__a_Z_0-");
  assert_eq!(sanitize_file_name("lodash.merge"), "lodash.merge");
}

#[test]
fn test_flatten_package_name() {
  assert_eq!(flatten_package_name("left-pad"), "left-pad");
  assert_eq!(flatten_package_name("@scope/pkg/sub"), "@scope+pkg+sub");
  assert_eq!(flatten_package_name("lodash\\fp"), "lodash+fp");
}
