use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use trimpack_utils::indexmap::FxIndexSet;

/// The bindings requested from one external package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum DependencyExports {
  /// Everything. Used when the bindings cannot be enumerated statically.
  All,
  Named(FxIndexSet<String>),
}

impl Default for DependencyExports {
  fn default() -> Self {
    Self::Named(FxIndexSet::default())
  }
}

impl DependencyExports {
  pub const WILDCARD: &'static str = "*";

  pub fn is_all(&self) -> bool {
    matches!(self, Self::All)
  }

  pub fn insert(&mut self, name: &str) {
    match self {
      Self::All => {}
      Self::Named(_) if name == Self::WILDCARD => *self = Self::All,
      Self::Named(names) => {
        names.insert(name.to_string());
      }
    }
  }

  /// Union. `All` absorbs any named set.
  pub fn merge(&mut self, other: Self) {
    match other {
      Self::All => *self = Self::All,
      Self::Named(other) => {
        if let Self::Named(names) = self {
          names.extend(other);
        }
      }
    }
  }

  pub fn to_vec(&self) -> Vec<String> {
    match self {
      Self::All => vec![Self::WILDCARD.to_string()],
      Self::Named(names) => names.iter().cloned().collect(),
    }
  }
}

impl From<Vec<String>> for DependencyExports {
  fn from(value: Vec<String>) -> Self {
    let mut exports = Self::default();
    value.iter().for_each(|name| exports.insert(name));
    exports
  }
}

impl From<DependencyExports> for Vec<String> {
  fn from(value: DependencyExports) -> Self {
    value.to_vec()
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyMetadata {
  pub exports: DependencyExports,
  pub root_path: Option<PathBuf>,
  pub is_workspace: bool,
}

impl DependencyMetadata {
  pub fn merge(&mut self, other: Self) {
    self.exports.merge(other.exports);
    if self.root_path.is_none() {
      self.root_path = other.root_path;
    }
    self.is_workspace |= other.is_workspace;
  }
}

#[test]
fn test_wildcard_absorbs_names() {
  let mut exports = DependencyExports::from(vec!["a".to_string()]);
  exports.merge(DependencyExports::All);
  assert!(exports.is_all());
  exports.merge(DependencyExports::from(vec!["b".to_string()]));
  assert_eq!(exports.to_vec(), vec!["*"]);

  let mut exports = DependencyExports::default();
  exports.insert("a");
  exports.insert("*");
  assert!(exports.is_all());
}

#[test]
fn test_serialize_metadata() {
  let mut exports = DependencyExports::default();
  exports.insert("a");
  exports.insert("b");
  exports.insert("a");
  let metadata = DependencyMetadata { exports, root_path: None, is_workspace: false };
  assert_eq!(
    serde_json::to_string(&metadata).unwrap(),
    r#"{"exports":["a","b"],"rootPath":null,"isWorkspace":false}"#
  );

  let metadata: DependencyMetadata =
    serde_json::from_str(r#"{"exports":["*"],"rootPath":null,"isWorkspace":true}"#).unwrap();
  assert!(metadata.exports.is_all());
  assert!(metadata.is_workspace);
}
