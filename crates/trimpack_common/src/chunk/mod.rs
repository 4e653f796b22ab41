use std::path::Path;

use arcstr::ArcStr;
use trimpack_utils::{bitset::BitSet, path_ext::PathExt};

use crate::{ChunkIdx, ChunkKind, FilenameTemplate, ModuleIdx, NormalizedCompileOptions};

#[derive(Debug, Default)]
pub struct Chunk {
  pub exec_order: u32,
  pub kind: ChunkKind,
  /// Sorted by execution order.
  pub modules: Vec<ModuleIdx>,
  pub name: Option<ArcStr>,
  pub filename: Option<ArcStr>,
  pub bits: BitSet,
  pub imports_from_other_chunks: Vec<ChunkIdx>,
  /// Module idx -> chunk that has to be loaded before the module can be required.
  pub dynamic_imports: Vec<(ModuleIdx, ChunkIdx)>,
  /// External modules this chunk imports, in first-use order.
  pub imports_from_external_modules: Vec<ModuleIdx>,
}

impl Chunk {
  pub fn new(name: Option<ArcStr>, bits: BitSet, modules: Vec<ModuleIdx>, kind: ChunkKind) -> Self {
    Self { exec_order: u32::MAX, modules, name, bits, kind, ..Self::default() }
  }

  pub fn filename_template(&self, options: &NormalizedCompileOptions) -> FilenameTemplate {
    let ret = if matches!(self.kind, ChunkKind::EntryPoint { is_user_defined, .. } if is_user_defined)
    {
      options.entry_filenames.clone()
    } else {
      options.chunk_filenames.clone()
    };

    FilenameTemplate::new(ret)
  }

  pub fn entry_module_idx(&self) -> Option<ModuleIdx> {
    match &self.kind {
      ChunkKind::EntryPoint { module, .. } => Some(*module),
      ChunkKind::Common => None,
    }
  }

  pub fn is_user_defined_entry(&self) -> bool {
    matches!(self.kind, ChunkKind::EntryPoint { is_user_defined: true, .. })
  }

  pub fn filename(&self) -> &str {
    self.filename.as_deref().unwrap_or_default()
  }

  /// `./`-prefixed path from this chunk to `target`, both relative to the output directory.
  pub fn import_path_for(&self, target: &str) -> String {
    let source_dir = Path::new(self.filename()).parent().unwrap_or(Path::new(""));
    let import_path = Path::new(target).relative_slash(source_dir);
    if import_path.starts_with('.') { import_path } else { format!("./{import_path}") }
  }
}

#[test]
fn test_import_path_for() {
  let chunk = Chunk { filename: Some("deps/left-pad.js".into()), ..Chunk::default() };
  assert_eq!(chunk.import_path_for("chunks/shared-abc.js"), "../chunks/shared-abc.js");
  assert_eq!(chunk.import_path_for("deps/other.js"), "./other.js");

  let chunk = Chunk { filename: Some("main.js".into()), ..Chunk::default() };
  assert_eq!(chunk.import_path_for("chunks/shared-abc.js"), "./chunks/shared-abc.js");
}
