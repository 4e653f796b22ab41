use std::fmt::Display;

use serde::Deserialize;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
  /// Represents the Node.js environment.
  #[default]
  Node,
  /// Represents the Browser environment.
  Browser,
  /// Represents a platform-agnostic environment.
  Neutral,
}

impl Display for Platform {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Node => write!(f, "node"),
      Self::Browser => write!(f, "browser"),
      Self::Neutral => write!(f, "neutral"),
    }
  }
}
