use trimpack_error::BuildResult;

use crate::{CompileOptions, Output};

#[derive(Debug, Default)]
pub struct CompileOutput {
  pub outputs: Vec<Output>,
  pub warnings: Vec<anyhow::Error>,
}

impl CompileOutput {
  pub fn chunks(&self) -> impl Iterator<Item = &crate::OutputChunk> {
    self.outputs.iter().filter_map(Output::as_chunk)
  }
}

/// The module compiler the pipeline drives. It bundles `input` with tree-shaking, serves
/// `virtual_modules` from memory and applies `alias` before regular resolution.
#[async_trait::async_trait]
pub trait ModuleCompiler: Send + Sync {
  async fn compile(&self, options: CompileOptions) -> BuildResult<CompileOutput>;
}
