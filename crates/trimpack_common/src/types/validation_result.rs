use std::path::PathBuf;

use serde::Serialize;
use trimpack_utils::indexmap::{FxIndexMap, FxIndexSet};

use crate::WorkspaceMap;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
  pub invalid_artifacts: FxIndexSet<String>,
  /// Package -> absolute path of its optimized artifact.
  pub resolved_dependency_files: FxIndexMap<String, PathBuf>,
  pub demoted_external_packages: FxIndexSet<String>,
  pub workspace_map: WorkspaceMap,
}
