use oxc_index::{index_vec, IndexVec};
use rustc_hash::FxHashMap;
use trimpack_common::{Chunk, ChunkKind, EntryPoint, ModuleIdx};
use trimpack_utils::bitset::BitSet;

use crate::graph::ChunkGraph;

use super::GenerateStage;

impl GenerateStage<'_> {
  /// With `inline_dynamic_imports`, only user-defined entries split the graph and dynamic
  /// imports are followed like static ones.
  fn chunk_entries(&self) -> Vec<&EntryPoint> {
    self
      .link_output
      .entry_points
      .iter()
      .filter(|entry| !self.options.inline_dynamic_imports || entry.kind.is_user_defined())
      .collect()
  }

  fn determine_reachable_modules_for_entry(
    &self,
    entry: ModuleIdx,
    entry_bit: u32,
    module_to_bits: &mut IndexVec<ModuleIdx, BitSet>,
  ) {
    let mut stack = vec![entry];
    while let Some(module_idx) = stack.pop() {
      if module_to_bits[module_idx].has_bit(entry_bit) {
        continue;
      }
      if self.link_output.module_table[module_idx].is_external() {
        continue;
      }
      module_to_bits[module_idx].set_bit(entry_bit);

      let meta = &self.link_output.metas[module_idx];
      stack.extend(meta.dependencies.iter().copied());
      if self.options.inline_dynamic_imports {
        stack.extend(meta.dynamic_dependencies.iter().copied());
      }
    }
  }

  pub(super) fn generate_chunks(&self) -> anyhow::Result<ChunkGraph> {
    let module_table = &self.link_output.module_table;
    let entries = self.chunk_entries();
    let entries_len = u32::try_from(entries.len())?;

    let mut chunk_graph = ChunkGraph::new(module_table.len());
    let mut module_to_bits = index_vec![BitSet::new(entries_len); module_table.len()];
    let mut bits_to_chunk = FxHashMap::default();

    for (entry_bit, entry) in (0..entries_len).zip(entries) {
      let mut bits = BitSet::new(entries_len);
      bits.set_bit(entry_bit);
      let chunk = Chunk::new(
        entry.name.clone(),
        bits.clone(),
        vec![],
        ChunkKind::EntryPoint {
          is_user_defined: entry.kind.is_user_defined(),
          bit: entry_bit,
          module: entry.idx,
        },
      );
      bits_to_chunk.insert(bits, chunk_graph.push_chunk(chunk));

      self.determine_reachable_modules_for_entry(entry.idx, entry_bit, &mut module_to_bits);
    }

    // Modules reached by the same set of entries share a chunk.
    for &module_idx in &self.link_output.sorted_modules {
      let bits = &module_to_bits[module_idx];
      if bits.is_empty() {
        continue;
      }
      let chunk_idx = match bits_to_chunk.get(bits) {
        Some(chunk_idx) => *chunk_idx,
        None => {
          let chunk = Chunk::new(None, bits.clone(), vec![], ChunkKind::Common);
          let chunk_idx = chunk_graph.push_chunk(chunk);
          bits_to_chunk.insert(bits.clone(), chunk_idx);
          chunk_idx
        }
      };
      chunk_graph.assign(module_idx, chunk_idx);
    }

    chunk_graph.sort_chunks(module_table);

    Ok(chunk_graph)
  }
}
