use arcstr::ArcStr;

use crate::ModuleIdx;

#[derive(Debug)]
pub struct ExternalModule {
  pub idx: ModuleIdx,
  /// The specifier as written, `left-pad` or `node:fs`.
  pub name: ArcStr,
  pub exec_order: u32,
}

impl ExternalModule {
  pub fn new(idx: ModuleIdx, name: ArcStr) -> Self {
    Self { idx, name, exec_order: u32::MAX }
  }
}
