use trimpack_common::ModuleIdx;

use crate::graph::ChunkGraph;

use super::GenerateStage;

impl GenerateStage<'_> {
  /// A chunk imports the registry of every chunk holding a dependency of one of its modules.
  /// Dependencies always live in chunks reached by a superset of entries, so these links never
  /// form a cycle.
  pub(super) fn compute_cross_chunk_links(&self, chunk_graph: &mut ChunkGraph) {
    let module_table = &self.link_output.module_table;

    for chunk_idx in chunk_graph.chunk_table.indices() {
      let mut imports_from_other_chunks = vec![];
      let mut imports_from_external_modules = vec![];
      let mut dynamic_imports = vec![];

      for module_idx in &chunk_graph.chunk_table[chunk_idx].modules {
        let meta = &self.link_output.metas[*module_idx];

        let mut add_static_dependency = |dep: ModuleIdx| {
          if module_table[dep].is_external() {
            if !imports_from_external_modules.contains(&dep) {
              imports_from_external_modules.push(dep);
            }
          } else if let Some(dep_chunk) = chunk_graph.chunk_of(dep) {
            if dep_chunk != chunk_idx && !imports_from_other_chunks.contains(&dep_chunk) {
              imports_from_other_chunks.push(dep_chunk);
            }
          }
        };

        meta.dependencies.iter().copied().for_each(&mut add_static_dependency);

        if self.options.inline_dynamic_imports {
          meta.dynamic_dependencies.iter().copied().for_each(&mut add_static_dependency);
        } else {
          for dep in &meta.dynamic_dependencies {
            if let Some(target_chunk) = chunk_graph.entry_chunk_of(*dep) {
              if !dynamic_imports.contains(&(*dep, target_chunk)) {
                dynamic_imports.push((*dep, target_chunk));
              }
            }
          }
        }
      }

      // An entry module reached by other entries too lives in a common chunk. The entry chunk
      // is then a facade importing it.
      if let Some(entry_module) = chunk_graph.chunk_table[chunk_idx].entry_module_idx() {
        if let Some(entry_chunk) = chunk_graph.chunk_of(entry_module) {
          if entry_chunk != chunk_idx && !imports_from_other_chunks.contains(&entry_chunk) {
            imports_from_other_chunks.push(entry_chunk);
          }
        }
      }

      let chunk = &mut chunk_graph.chunk_table[chunk_idx];
      chunk.imports_from_other_chunks = imports_from_other_chunks;
      chunk.imports_from_external_modules = imports_from_external_modules;
      chunk.dynamic_imports = dynamic_imports;
    }
  }
}
