oxc_index::define_index_type! {
  #[derive(Default)]
  pub struct RawIdx = u32;
}

pub type ChunkIdx = RawIdx;
pub type ModuleIdx = RawIdx;
pub type ImportRecordIdx = RawIdx;

/// Target of an import record whose module is never loaded.
pub const DUMMY_MODULE_IDX: ModuleIdx = ModuleIdx::from_usize_unchecked((u32::MAX - 1) as usize);
