use arcstr::ArcStr;
use trimpack_common::{Chunk, ImportKind, Module, ModuleBody, ModuleIdx, NormalModule, OutputChunk};
use trimpack_utils::{
  concat_string,
  ecmascript::{js_string, property_access_str, to_module_import_export_name},
  indexmap::{FxIndexMap, FxIndexSet},
};

use crate::graph::ChunkGraph;

use super::{runtime::RUNTIME_CODE, GenerateStage};

/// `{}` or one `key: value` pair per line.
fn render_object(entries: &[(String, String)]) -> String {
  if entries.is_empty() {
    return "{}".to_string();
  }
  let mut object = String::from("{\n");
  for (key, value) in entries {
    object.push_str(&concat_string!("  ", js_string(key), ": ", value, ",\n"));
  }
  object.push('}');
  object
}

fn push_unique(list: &mut Vec<String>, value: &str) {
  if !list.iter().any(|item| item == value) {
    list.push(value.to_string());
  }
}

impl GenerateStage<'_> {
  fn is_dynamic_import_target(&self, module_idx: ModuleIdx) -> bool {
    self.link_output.metas.iter().any(|meta| meta.dynamic_dependencies.contains(&module_idx))
  }

  fn render_module_record(
    &self,
    chunk: &Chunk,
    chunk_graph: &ChunkGraph,
    module: &NormalModule,
  ) -> String {
    let (esm, params, body) = match &module.body {
      ModuleBody::Script(body) if !module.is_commonjs() => {
        (true, "__trimpack_module, __trimpack_exports", body.clone())
      }
      ModuleBody::Script(body) => (false, "module, exports, require", body.clone()),
      ModuleBody::Asset(_) => {
        let filename =
          chunk_graph.asset_filenames.get(&module.idx).map(String::as_str).unwrap_or_default();
        let body = concat_string!(
          "module.exports = new URL(",
          js_string(&chunk.import_path_for(filename)),
          ", import.meta.url).href;\n"
        );
        (false, "module, exports, require", body)
      }
    };
    concat_string!(
      "{ esm: ",
      if esm { "true" } else { "false" },
      ", init: function (",
      params,
      ") {\n",
      body.trim_end(),
      "\n} }"
    )
  }

  pub(super) fn render_chunk(&self, chunk_graph: &ChunkGraph, chunk: &Chunk) -> OutputChunk {
    let module_table = &self.link_output.module_table;
    let metas = &self.link_output.metas;

    let mut code = String::new();
    let mut imports = vec![];
    let mut dynamic_imports = vec![];

    for (i, external) in chunk.imports_from_external_modules.iter().enumerate() {
      code.push_str(&concat_string!(
        "import * as __trimpack_ext_",
        i.to_string(),
        " from ",
        js_string(module_table[*external].id()),
        ";\n"
      ));
    }

    let mut registries = vec!["Object.create(null)".to_string()];
    for (i, other) in chunk.imports_from_other_chunks.iter().enumerate() {
      let filename = chunk_graph.chunk_table[*other].filename();
      let binding = concat_string!("__trimpack_chunk_", i.to_string());
      code.push_str(&concat_string!(
        "import { __trimpack_modules as ",
        binding,
        " } from ",
        js_string(&chunk.import_path_for(filename)),
        ";\n"
      ));
      registries.push(binding);
      push_unique(&mut imports, filename);
    }

    let externals = chunk
      .imports_from_external_modules
      .iter()
      .enumerate()
      .map(|(i, external)| {
        let name = module_table[*external].id();
        push_unique(&mut imports, name);
        (name.to_string(), concat_string!("__trimpack_ext_", i.to_string()))
      })
      .collect::<Vec<_>>();
    code.push_str(&concat_string!(
      "const __trimpack_externals = ",
      render_object(&externals),
      ";\n"
    ));

    let dynamic_chunks = chunk
      .dynamic_imports
      .iter()
      .map(|(module_idx, target_chunk)| {
        let filename = chunk_graph.chunk_table[*target_chunk].filename();
        push_unique(&mut dynamic_imports, filename);
        let key = module_table[*module_idx].stable_id().to_string();
        (key, js_string(&chunk.import_path_for(filename)))
      })
      .collect::<Vec<_>>();
    code.push_str(&concat_string!(
      "const __trimpack_dynamic_chunks = ",
      render_object(&dynamic_chunks),
      ";\n"
    ));

    let mut imported_bindings: FxIndexMap<String, FxIndexSet<String>> = FxIndexMap::default();
    let records = chunk
      .modules
      .iter()
      .filter_map(|module_idx| module_table[*module_idx].as_normal())
      .map(|module| {
        for (external, names) in &metas[module.idx].imported_external_bindings {
          imported_bindings
            .entry(module_table[*external].id().to_string())
            .or_default()
            .extend(names.iter().map(ToString::to_string));
        }
        for rec in module.import_records.iter().filter(|rec| !rec.is_dropped()) {
          let target = &module_table[rec.state];
          if matches!(rec.kind, ImportKind::DynamicImport) && target.is_external() {
            push_unique(&mut dynamic_imports, target.id());
          }
        }
        (module.stable_id.clone(), self.render_module_record(chunk, chunk_graph, module))
      })
      .collect::<Vec<_>>();
    registries.push(render_object(&records));
    code.push_str(&concat_string!(
      "const __trimpack_modules = Object.assign(",
      registries.join(", "),
      ");\n\n"
    ));

    code.push_str(RUNTIME_CODE);

    let entry_module = chunk.entry_module_idx().and_then(|idx| module_table[idx].as_normal());
    let is_dynamic_entry =
      entry_module.is_some_and(|module| self.is_dynamic_import_target(module.idx));
    // Other chunks merge the registry of a common chunk, and `import()` of an entry goes through
    // its loader. Nothing else is exported besides the entry's own bindings.
    if chunk.entry_module_idx().is_none() {
      code.push_str("\nexport { __trimpack_modules };\n");
    } else if is_dynamic_entry && !self.options.inline_dynamic_imports {
      code.push_str("\nexport { __trimpack_load };\n");
    }

    let mut exports = vec![];
    if let Some(entry_module) = entry_module.filter(|_| chunk.is_user_defined_entry()) {
      let meta = &metas[entry_module.idx];
      code.push_str(&concat_string!(
        "\nconst __trimpack_entry = __trimpack_load(",
        js_string(&entry_module.stable_id),
        ");\n"
      ));

      let mut specifiers = vec![];
      for (i, name) in meta.resolved_exports.iter().enumerate() {
        let binding = concat_string!("__trimpack_export_", i.to_string());
        code.push_str(&concat_string!(
          "const ",
          binding,
          " = ",
          property_access_str("__trimpack_entry", name),
          ";\n"
        ));
        specifiers.push(concat_string!(binding, " as ", to_module_import_export_name(name)));
        exports.push(name.to_string());
      }
      if !specifiers.is_empty() {
        code.push_str(&concat_string!("export { ", specifiers.join(", "), " };\n"));
      }

      for external in &meta.star_exports_from_external_modules {
        let name = module_table[*external].id();
        code.push_str(&concat_string!("export * from ", js_string(name), ";\n"));
        push_unique(&mut imports, name);
      }
    }

    let facade_module_id = entry_module.map(|module| module.id.clone());
    OutputChunk {
      name: chunk.name.clone().unwrap_or_else(|| arcstr::literal!("chunk")),
      filename: chunk.filename.clone().unwrap_or_else(ArcStr::default),
      is_entry: chunk.is_user_defined_entry(),
      is_dynamic_entry,
      facade_module_id,
      module_ids: chunk
        .modules
        .iter()
        .filter_map(|idx| match &module_table[*idx] {
          Module::Normal(module) => Some(module.id.clone()),
          Module::External(_) => None,
        })
        .collect(),
      exports,
      imports,
      dynamic_imports,
      imported_bindings: imported_bindings
        .into_iter()
        .map(|(source, names)| (source, names.into_iter().collect()))
        .collect(),
      code,
    }
  }
}
