use oxc::syntax::identifier;

use crate::concat_string;

pub fn is_validate_identifier_name(name: &str) -> bool {
  identifier::is_identifier_name(name)
}

/// Quotes `value` as a JS string literal.
pub fn js_string(value: &str) -> String {
  serde_json::to_string(value).unwrap_or_else(|_| concat_string!("\"", value, "\""))
}

pub fn property_access_str(obj: &str, prop: &str) -> String {
  if is_validate_identifier_name(prop) {
    concat_string!(obj, ".", prop)
  } else {
    concat_string!(obj, "[", js_string(prop), "]")
  }
}

pub fn to_module_import_export_name(name: &str) -> String {
  if is_validate_identifier_name(name) { name.into() } else { js_string(name) }
}

/// Turns an arbitrary string into something usable as a JS binding name.
pub fn legitimize_identifier_name(name: &str) -> String {
  let mut legitimized = String::with_capacity(name.len());
  for (idx, char) in name.chars().enumerate() {
    let valid = if idx == 0 {
      identifier::is_identifier_start(char)
    } else {
      identifier::is_identifier_part(char)
    };
    legitimized.push(if valid { char } else { '_' });
  }
  if legitimized.is_empty() {
    legitimized.push('_');
  }
  legitimized
}

#[test]
fn test_is_validate_identifier_name() {
  assert!(is_validate_identifier_name("foo"));
  assert!(!is_validate_identifier_name("1aaaa"));
  assert!(!is_validate_identifier_name("😈"));
}

#[test]
fn test_property_access_str() {
  assert_eq!(property_access_str("ns", "foo"), "ns.foo");
  assert_eq!(property_access_str("ns", "x-y"), "ns[\"x-y\"]");
  assert_eq!(to_module_import_export_name("x-y"), "\"x-y\"");
  assert_eq!(legitimize_identifier_name("left-pad"), "left_pad");
  assert_eq!(legitimize_identifier_name("1st"), "_st");
}
