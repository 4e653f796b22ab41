pub mod bitset;
pub mod ecmascript;
pub mod indexmap;
pub mod node_builtins;
pub mod package_name;
pub mod path_ext;
pub mod sanitize_file_name;
pub mod xxhash;

/// Concatenates string slices into a `String` allocated once with the exact capacity.
#[macro_export]
macro_rules! concat_string {
  ($($s:expr),+ $(,)?) => {{
    let mut len = 0;
    $(len += AsRef::<str>::as_ref(&$s).len();)+
    let mut buf = String::with_capacity(len);
    $(buf.push_str($s.as_ref());)+
    buf
  }};
}

#[test]
fn test_concat_string() {
  let name = String::from("left-pad");
  assert_eq!(concat_string!("deps/", name, ".js"), "deps/left-pad.js");
}
