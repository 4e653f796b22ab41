use std::{path::Path, sync::Arc};

use arcstr::ArcStr;

use crate::{ModuleId, PackageJson};

#[derive(Debug, Clone)]
pub struct ResolvedId {
  pub id: ArcStr,
  pub is_external: bool,
  /// Manifest of the package owning the resolved file, if any.
  pub package_json: Option<Arc<PackageJson>>,
}

impl ResolvedId {
  pub fn external(id: impl Into<ArcStr>) -> Self {
    Self { id: id.into(), is_external: true, package_json: None }
  }

  pub fn debug_id(&self, cwd: &Path) -> String {
    ModuleId::new(ArcStr::clone(&self.id)).stabilize(cwd).replace('\0', "\\0")
  }
}
