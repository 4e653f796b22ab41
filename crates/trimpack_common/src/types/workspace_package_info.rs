use std::path::PathBuf;

use serde::Serialize;
use trimpack_utils::indexmap::FxIndexMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspacePackageInfo {
  pub location: PathBuf,
  pub dependencies: Option<FxIndexMap<String, String>>,
  pub version: Option<String>,
}

/// Package name -> info, in discovery order.
pub type WorkspaceMap = FxIndexMap<String, WorkspacePackageInfo>;
