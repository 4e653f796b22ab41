use std::path::Path;

use arcstr::ArcStr;
use rustc_hash::FxHashSet;
use trimpack_common::{ChunkKind, FilenameTemplate, ModuleBody};
use trimpack_utils::{
  concat_string, path_ext::PathExt, sanitize_file_name::sanitize_file_name, xxhash::short_hash,
};

use crate::graph::ChunkGraph;

use super::GenerateStage;

const HASH_LENGTH: usize = 8;

/// Renders `template`, appending a counter to `name` until the file name is unused.
fn render_unique_filename(
  used_filenames: &mut FxHashSet<String>,
  template: &FilenameTemplate,
  name: &str,
  hash: &str,
  extension: Option<&str>,
) -> String {
  let mut candidate = template.render(name, Some(hash), extension);
  let mut count = 2u32;
  while used_filenames.contains(&candidate) {
    candidate = template.render(&concat_string!(name, count.to_string()), Some(hash), extension);
    count += 1;
  }
  used_filenames.insert(candidate.clone());
  candidate
}

impl GenerateStage<'_> {
  /// Notices:
  /// - Should generate filenames that are stable cross builds and os.
  pub(super) fn generate_chunk_name_and_filenames(&self, chunk_graph: &mut ChunkGraph) {
    let module_table = &self.link_output.module_table;
    let mut used_filenames = FxHashSet::default();

    for chunk_idx in &chunk_graph.chunk_order {
      let chunk = &mut chunk_graph.chunk_table[*chunk_idx];

      let name = match (&chunk.name, &chunk.kind) {
        (Some(name), _) => ArcStr::clone(name),
        (None, ChunkKind::EntryPoint { module, .. }) => {
          let path = Path::new(module_table[*module].id());
          ArcStr::from(sanitize_file_name(&path.representative_file_name()))
        }
        // Like rollup, common chunks are named after their last executed module.
        (None, ChunkKind::Common) => chunk.modules.last().map_or_else(
          || arcstr::literal!("chunk"),
          |module_idx| {
            let path = Path::new(module_table[*module_idx].id());
            ArcStr::from(sanitize_file_name(&path.representative_file_name()))
          },
        ),
      };

      let mut stable_ids =
        chunk.modules.iter().map(|idx| module_table[*idx].stable_id()).collect::<Vec<_>>();
      if let Some(entry_module) = chunk.entry_module_idx() {
        stable_ids.push(module_table[entry_module].stable_id());
      }
      stable_ids.sort_unstable();
      let hash = short_hash(stable_ids.join("\n").as_bytes(), HASH_LENGTH);

      let template = chunk.filename_template(self.options);
      let filename = render_unique_filename(&mut used_filenames, &template, &name, &hash, None);

      chunk.name = Some(name);
      chunk.filename = Some(filename.into());
    }

    let asset_template = FilenameTemplate::new(self.options.asset_filenames.clone());
    for module in module_table.iter().filter_map(|module| module.as_normal()) {
      let ModuleBody::Asset(source) = &module.body else {
        continue;
      };
      let path = Path::new(&*module.id);
      let name = path.file_stem().map_or_else(|| "asset".into(), |stem| stem.to_string_lossy());
      let extension = path.extension().map(|ext| ext.to_string_lossy());
      let filename = render_unique_filename(
        &mut used_filenames,
        &asset_template,
        &sanitize_file_name(&name),
        &short_hash(source, HASH_LENGTH),
        extension.as_deref(),
      );
      chunk_graph.asset_filenames.insert(module.idx, filename);
    }
  }
}
