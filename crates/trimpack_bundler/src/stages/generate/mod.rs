mod code_splitting;
mod compute_cross_chunk_links;
mod generate_chunk_name_and_filenames;
mod render_chunk;
mod runtime;

use trimpack_common::{ModuleBody, Output, OutputAsset};
use trimpack_error::BuildResult;

use crate::types::SharedOptions;

use super::link::LinkStageOutput;

pub struct GenerateStage<'a> {
  link_output: &'a LinkStageOutput,
  options: &'a SharedOptions,
}

impl<'a> GenerateStage<'a> {
  pub fn new(link_output: &'a LinkStageOutput, options: &'a SharedOptions) -> Self {
    Self { link_output, options }
  }

  #[tracing::instrument(level = "debug", skip_all)]
  pub fn generate(&self) -> BuildResult<Vec<Output>> {
    let mut chunk_graph = self.generate_chunks()?;
    self.compute_cross_chunk_links(&mut chunk_graph);
    self.generate_chunk_name_and_filenames(&mut chunk_graph);

    let mut outputs = chunk_graph
      .chunk_order
      .iter()
      .map(|chunk_idx| {
        let chunk = &chunk_graph.chunk_table[*chunk_idx];
        Output::Chunk(Box::new(self.render_chunk(&chunk_graph, chunk)))
      })
      .collect::<Vec<_>>();

    for module in &self.link_output.module_table {
      let Some(module) = module.as_normal() else { continue };
      let (ModuleBody::Asset(source), Some(filename)) =
        (&module.body, chunk_graph.asset_filenames.get(&module.idx))
      else {
        continue;
      };
      outputs.push(Output::Asset(Box::new(OutputAsset {
        filename: filename.as_str().into(),
        source: source.clone(),
      })));
    }

    tracing::debug!(outputs = outputs.len(), "generated outputs");
    Ok(outputs)
  }
}
