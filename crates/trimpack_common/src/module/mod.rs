pub mod external_module;
pub mod normal_module;

use crate::{ExternalModule, NormalModule, ResolvedImportRecord};

/// A slot of the module table. Externals are leaves, they are never loaded.
#[derive(Debug)]
pub enum Module {
  Normal(Box<NormalModule>),
  External(Box<ExternalModule>),
}

impl Module {
  /// Resolved path for bundled modules, the specifier for externals.
  pub fn id(&self) -> &str {
    match self {
      Self::Normal(module) => &module.id,
      Self::External(module) => &module.name,
    }
  }

  /// Registry key of bundled modules.
  pub fn stable_id(&self) -> &str {
    match self {
      Self::Normal(module) => &module.stable_id,
      Self::External(module) => &module.name,
    }
  }

  pub fn exec_order(&self) -> u32 {
    match self {
      Self::Normal(module) => module.exec_order,
      Self::External(module) => module.exec_order,
    }
  }

  pub fn set_exec_order(&mut self, exec_order: u32) {
    match self {
      Self::Normal(module) => module.exec_order = exec_order,
      Self::External(module) => module.exec_order = exec_order,
    }
  }

  pub fn import_records(&self) -> &[ResolvedImportRecord] {
    match self {
      Self::Normal(module) => &module.import_records.raw,
      Self::External(_) => &[],
    }
  }

  pub fn as_normal(&self) -> Option<&NormalModule> {
    match self {
      Self::Normal(module) => Some(module),
      Self::External(_) => None,
    }
  }

  pub fn is_external(&self) -> bool {
    matches!(self, Self::External(..))
  }
}

impl From<NormalModule> for Module {
  fn from(module: NormalModule) -> Self {
    Self::Normal(Box::new(module))
  }
}

impl From<ExternalModule> for Module {
  fn from(module: ExternalModule) -> Self {
    Self::External(Box::new(module))
  }
}
