use std::path::Path;

use anyhow::Context;
use rustc_hash::{FxHashMap, FxHashSet};
use trimpack_common::{ModuleId, Output, OutputChunk, ResolutionMap, MODULE_RESOLVE_MAP_FILENAME};
use trimpack_error::BuildResult;
use trimpack_fs::FileSystem;
use trimpack_utils::indexmap::FxIndexMap;

const OUTPUT_EXTENSIONS: [&str; 3] = [".js", ".mjs", ".cjs"];

/// Finds, for every entry artifact and external it needs at runtime, the module that really
/// imports the external. Synthesized modules are looked through.
pub struct ResolveMapBuilder<'a> {
  artifacts: FxIndexMap<&'a str, &'a OutputChunk>,
  /// (artifact, external) -> importing artifact
  memo: FxHashMap<(&'a str, String), Option<&'a str>>,
}

impl<'a> ResolveMapBuilder<'a> {
  pub fn new(output: &'a [Output]) -> Self {
    let artifacts = output
      .iter()
      .filter_map(Output::as_chunk)
      .map(|chunk| (chunk.filename.as_str(), chunk))
      .collect();
    Self { artifacts, memo: FxHashMap::default() }
  }

  #[tracing::instrument(level = "debug", skip_all)]
  pub fn build<S: AsRef<str>>(&mut self, externals: &[S]) -> ResolutionMap {
    let entries = self
      .artifacts
      .values()
      .filter(|chunk| chunk.is_entry || chunk.is_dynamic_entry)
      .map(|chunk| chunk.filename.as_str())
      .collect::<Vec<_>>();

    let mut map = ResolutionMap::default();
    for entry in entries {
      for external in externals.iter().map(AsRef::as_ref) {
        let mut visited = FxHashSet::default();
        let Some(importer) = self.find_external_importer(entry, external, &mut visited) else {
          self.memo.insert((entry, external.to_string()), None);
          continue;
        };
        let Some(module_id) = self.artifacts.get(importer).and_then(|chunk| concrete_module(chunk))
        else {
          continue;
        };
        map
          .entry(entry.to_string())
          .or_default()
          .insert(external.to_string(), module_id.to_string());
      }
    }
    map
  }

  /// The artifact reachable from `filename` that imports `external` itself.
  fn find_external_importer(
    &mut self,
    filename: &'a str,
    external: &str,
    visited: &mut FxHashSet<&'a str>,
  ) -> Option<&'a str> {
    let key = (filename, external.to_string());
    if let Some(cached) = self.memo.get(&key) {
      return *cached;
    }
    if !visited.insert(filename) {
      return None;
    }
    let chunk = *self.artifacts.get(filename)?;

    let found = if chunk.imports.iter().any(|import| import == external) {
      Some(filename)
    } else {
      chunk
        .imports
        .iter()
        .filter(|import| OUTPUT_EXTENSIONS.iter().any(|ext| import.ends_with(ext)))
        .filter_map(|import| self.artifacts.get_key_value(import.as_str()).map(|(key, _)| *key))
        .collect::<Vec<_>>()
        .into_iter()
        .find_map(|sibling| self.find_external_importer(sibling, external, visited))
    };

    // A miss may only be a cycle cut short by `visited`.
    if found.is_some() {
      self.memo.insert(key, found);
    }
    found
  }
}

/// The last module compiled into `chunk`, or the one before it when the last is synthesized.
fn concrete_module(chunk: &OutputChunk) -> Option<&ModuleId> {
  let mut ids = chunk.module_ids.iter().rev();
  let last = ids.next()?;
  let id = if last.is_virtual() { ids.next()? } else { last };
  (!id.is_virtual()).then_some(id)
}

/// Writes `module-resolve-map.json` into `output_dir`.
pub fn write_resolution_map(
  fs: &dyn FileSystem,
  output_dir: &Path,
  map: &ResolutionMap,
) -> BuildResult<()> {
  let path = output_dir.join(MODULE_RESOLVE_MAP_FILENAME);
  let content = serde_json::to_string_pretty(map).context("Failed to serialize the resolve map")?;
  fs.write(&path, content.as_bytes())
    .with_context(|| format!("Failed to write {}", path.display()))?;
  Ok(())
}

#[cfg(test)]
use trimpack_common::virtual_module_id;

#[cfg(test)]
fn chunk(filename: &str, is_entry: bool, imports: &[&str], module_ids: &[&str]) -> Output {
  Output::Chunk(Box::new(OutputChunk {
    filename: filename.into(),
    is_entry,
    imports: imports.iter().map(ToString::to_string).collect(),
    module_ids: module_ids.iter().map(|id| ModuleId::from(*id)).collect(),
    ..OutputChunk::default()
  }))
}

#[test]
fn test_looks_through_synthesized_artifacts() {
  let virtual_b = virtual_module_id("deps/b");
  let output = vec![
    chunk("deps/a.js", true, &["chunks/b-1234.js"], &[&virtual_module_id("deps/a")]),
    chunk("chunks/b-1234.js", false, &["pkg"], &["/app/node_modules/b/index.js", &virtual_b]),
  ];

  let map = ResolveMapBuilder::new(&output).build(&["pkg"]);
  assert_eq!(map.len(), 1);
  assert_eq!(map["deps/a.js"]["pkg"], "/app/node_modules/b/index.js");
}

#[test]
fn test_direct_importer() {
  let output = vec![chunk(
    "deps/left-pad.js",
    true,
    &["node:fs"],
    &["/app/node_modules/left-pad/lib/pad.js", "/app/node_modules/left-pad/index.js"],
  )];
  let map = ResolveMapBuilder::new(&output).build(&["node:fs", "sharp"]);
  assert_eq!(map["deps/left-pad.js"]["node:fs"], "/app/node_modules/left-pad/index.js");
  assert!(!map["deps/left-pad.js"].contains_key("sharp"));
}

#[test]
fn test_cycles_and_unreal_importers() {
  let only_virtual = virtual_module_id("deps/c");
  let output = vec![
    chunk("deps/a.js", true, &["chunks/x.js"], &["/a.js"]),
    chunk("chunks/x.js", false, &["chunks/y.js", "chunks/missing.js"], &["/x.js"]),
    chunk("chunks/y.js", false, &["chunks/x.js"], &["/y.js"]),
    chunk("deps/c.js", true, &["pkg"], &[&only_virtual]),
  ];
  let map = ResolveMapBuilder::new(&output).build(&["pkg"]);
  assert!(map.is_empty());
}

#[test]
fn test_write_resolution_map() {
  let dir = tempfile::tempdir().unwrap();
  let mut map = ResolutionMap::default();
  map.entry("deps/a.js".to_string()).or_default().insert("pkg".into(), "/b.js".into());
  write_resolution_map(&trimpack_fs::OsFileSystem, dir.path(), &map).unwrap();

  let written = std::fs::read_to_string(dir.path().join(MODULE_RESOLVE_MAP_FILENAME)).unwrap();
  let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
  assert_eq!(parsed["deps/a.js"]["pkg"], "/b.js");
}
