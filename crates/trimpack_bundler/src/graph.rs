use oxc_index::{index_vec, IndexVec};
use rustc_hash::FxHashMap;
use trimpack_common::{Chunk, ChunkIdx, ChunkKind, ModuleIdx};

use crate::types::IndexModules;

/// Chunks produced by code splitting and the module to chunk assignment.
#[derive(Debug)]
pub struct ChunkGraph {
  pub chunk_table: IndexVec<ChunkIdx, Chunk>,
  /// Emission order, filled by [`ChunkGraph::sort_chunks`].
  pub chunk_order: Vec<ChunkIdx>,
  /// Asset module -> emitted file name.
  pub asset_filenames: FxHashMap<ModuleIdx, String>,
  module_chunks: IndexVec<ModuleIdx, Option<ChunkIdx>>,
  entry_chunks: FxHashMap<ModuleIdx, ChunkIdx>,
}

impl ChunkGraph {
  pub fn new(module_count: usize) -> Self {
    Self {
      chunk_table: IndexVec::default(),
      chunk_order: Vec::new(),
      asset_filenames: FxHashMap::default(),
      module_chunks: index_vec![None; module_count],
      entry_chunks: FxHashMap::default(),
    }
  }

  pub fn push_chunk(&mut self, chunk: Chunk) -> ChunkIdx {
    let entry_module = chunk.entry_module_idx();
    let chunk_idx = self.chunk_table.push(chunk);
    if let Some(module_idx) = entry_module {
      self.entry_chunks.insert(module_idx, chunk_idx);
    }
    chunk_idx
  }

  pub fn assign(&mut self, module_idx: ModuleIdx, chunk_idx: ChunkIdx) {
    self.chunk_table[chunk_idx].modules.push(module_idx);
    self.module_chunks[module_idx] = Some(chunk_idx);
  }

  /// The chunk holding the module's code.
  pub fn chunk_of(&self, module_idx: ModuleIdx) -> Option<ChunkIdx> {
    self.module_chunks[module_idx]
  }

  /// The chunk created for the module as an entry point. It may differ from [`Self::chunk_of`]
  /// when other entries reach the module too.
  pub fn entry_chunk_of(&self, module_idx: ModuleIdx) -> Option<ChunkIdx> {
    self.entry_chunks.get(&module_idx).copied()
  }

  /// User-defined entries first, then dynamic entries, then common chunks. Chunks of the same
  /// rank follow the earliest execution order among their modules.
  pub fn sort_chunks(&mut self, module_table: &IndexModules) {
    for chunk in self.chunk_table.iter_mut() {
      chunk.exec_order = chunk
        .modules
        .iter()
        .map(|module_idx| module_table[*module_idx].exec_order())
        .min()
        .unwrap_or(u32::MAX);
    }

    let mut chunk_order = self.chunk_table.indices().collect::<Vec<_>>();
    chunk_order.sort_by_key(|chunk_idx| {
      let chunk = &self.chunk_table[*chunk_idx];
      let rank = match chunk.kind {
        ChunkKind::EntryPoint { is_user_defined: true, .. } => 0,
        ChunkKind::EntryPoint { is_user_defined: false, .. } => 1,
        ChunkKind::Common => 2,
      };
      (rank, chunk.exec_order)
    });
    self.chunk_order = chunk_order;
  }
}
