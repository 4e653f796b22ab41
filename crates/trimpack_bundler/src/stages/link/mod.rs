mod compute_dependencies;
mod resolve_exports;
mod sort_modules;

use oxc_index::IndexVec;
use trimpack_common::{EntryPoint, ModuleIdx};

use crate::types::{
  linking_metadata::{LinkingMetadata, LinkingMetadataVec},
  IndexModules,
};

use super::scan::ScanStageOutput;

#[derive(Debug)]
pub struct LinkStageOutput {
  pub module_table: IndexModules,
  pub entry_points: Vec<EntryPoint>,
  pub sorted_modules: Vec<ModuleIdx>,
  pub metas: LinkingMetadataVec,
  pub warnings: Vec<anyhow::Error>,
}

#[derive(Debug)]
pub struct LinkStage {
  pub module_table: IndexModules,
  pub entry_points: Vec<EntryPoint>,
  pub sorted_modules: Vec<ModuleIdx>,
  pub metas: LinkingMetadataVec,
  pub warnings: Vec<anyhow::Error>,
}

impl LinkStage {
  pub fn new(scan_stage_output: ScanStageOutput) -> Self {
    let metas = scan_stage_output
      .module_table
      .iter()
      .map(|_| LinkingMetadata::default())
      .collect::<IndexVec<ModuleIdx, _>>();

    Self {
      module_table: scan_stage_output.module_table,
      entry_points: scan_stage_output.entry_points,
      sorted_modules: Vec::new(),
      metas,
      warnings: scan_stage_output.warnings,
    }
  }

  #[tracing::instrument(level = "debug", skip_all)]
  pub fn link(mut self) -> LinkStageOutput {
    self.sort_modules();
    self.compute_dependencies();
    self.resolve_exports();

    LinkStageOutput {
      module_table: self.module_table,
      entry_points: self.entry_points,
      sorted_modules: self.sorted_modules,
      metas: self.metas,
      warnings: self.warnings,
    }
  }
}
