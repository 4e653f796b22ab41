mod synthetic_source;

use std::path::{Path, PathBuf};

use rustc_hash::{FxHashMap, FxHashSet};
use trimpack_common::{
  virtual_module_id, CompileOptions, CompileOutput, DependencyMetadata, ExternalOption,
  InputItem, ModuleCompiler, NormalizedAnalyzeOptions, Output, VirtualDependencyEntry,
  WorkspaceMap, TOOL_BINDINGS_ALIAS,
};
use trimpack_error::BuildResult;
use trimpack_utils::{
  concat_string,
  indexmap::{FxIndexMap, FxIndexSet},
  package_name::package_name_of,
  path_ext::PathExt,
  sanitize_file_name::flatten_package_name,
};

pub use self::synthetic_source::synthesize_source;

#[derive(Debug, Default)]
pub struct OptimizeOutput {
  pub output: Vec<Output>,
  /// Entry chunk file name -> the package it was synthesized for.
  pub file_name_to_dependency_map: FxIndexMap<String, String>,
  /// Specifiers the produced chunks still import.
  pub used_externals: FxIndexSet<String>,
}

/// Compiles every used package into a standalone artifact that exports only what the program
/// imports from it.
pub struct DependencyOptimizer<'a> {
  compiler: &'a dyn ModuleCompiler,
  options: &'a NormalizedAnalyzeOptions,
  workspace_map: &'a WorkspaceMap,
}

impl<'a> DependencyOptimizer<'a> {
  pub fn new(
    compiler: &'a dyn ModuleCompiler,
    options: &'a NormalizedAnalyzeOptions,
    workspace_map: &'a WorkspaceMap,
  ) -> Self {
    Self { compiler, options, workspace_map }
  }

  /// Externals stay external and the tool bindings are provided by the runtime.
  pub fn should_optimize(&self, package: &str) -> bool {
    package != TOOL_BINDINGS_ALIAS
      && !self.options.is_ignored(package)
      && !self.options.external.is_external(package)
  }

  /// Package -> the synthesized module compiled for it.
  pub fn virtual_entries(
    &self,
    dependencies: &FxIndexMap<String, DependencyMetadata>,
    output_dir: &Path,
  ) -> FxIndexMap<String, VirtualDependencyEntry> {
    dependencies
      .iter()
      .filter(|(package, _)| self.should_optimize(package))
      .map(|(package, metadata)| {
        let entry = VirtualDependencyEntry {
          name: self.artifact_name(package, metadata, output_dir),
          synthetic_source: synthesize_source(package, &metadata.exports),
        };
        (package.clone(), entry)
      })
      .collect()
  }

  /// `deps/<name>`, or the package's own cache directory for workspace packages in dev mode so
  /// the artifact can be found without the top-level build.
  fn artifact_name(
    &self,
    package: &str,
    metadata: &DependencyMetadata,
    output_dir: &Path,
  ) -> String {
    let file_name = flatten_package_name(package);
    if self.options.dev && metadata.is_workspace {
      let workspace_package = package_name_of(package).unwrap_or(package);
      if let Some(info) = self.workspace_map.get(workspace_package) {
        let cached = info.location.join(".trimpack").join("deps").join(&file_name);
        return cached.relative_slash(output_dir);
      }
    }
    concat_string!("deps/", file_name)
  }

  fn transform_include(
    &self,
    dependencies: &FxIndexMap<String, DependencyMetadata>,
  ) -> Vec<PathBuf> {
    let workspace_roots = self.workspace_map.values().map(|info| info.location.clone());
    let transpiled_roots = self
      .options
      .transpile_packages
      .iter()
      .filter_map(|package| dependencies.get(package)?.root_path.clone());
    workspace_roots.chain(transpiled_roots).collect()
  }

  #[tracing::instrument(level = "debug", skip_all, fields(output_dir = %output_dir.display()))]
  pub async fn optimize(
    &self,
    dependencies: &FxIndexMap<String, DependencyMetadata>,
    output_dir: &Path,
  ) -> BuildResult<OptimizeOutput> {
    let entries = self.virtual_entries(dependencies, output_dir);
    if entries.is_empty() {
      tracing::debug!("nothing to optimize");
      return Ok(OptimizeOutput::default());
    }

    let external = self
      .options
      .external
      .all()
      .into_iter()
      .chain(self.options.ignore_list.iter().cloned())
      .collect::<FxIndexSet<_>>();
    let compile_options = CompileOptions {
      input: Some(
        entries
          .values()
          .map(|entry| InputItem::named(entry.name.clone(), virtual_module_id(&entry.name)))
          .collect(),
      ),
      cwd: Some(self.options.cwd.clone()),
      platform: Some(self.options.platform),
      virtual_modules: Some(
        entries
          .values()
          .map(|entry| (virtual_module_id(&entry.name), entry.synthetic_source.clone()))
          .collect(),
      ),
      external: Some(ExternalOption::Packages(external.into_iter().collect())),
      transform_include: Some(self.transform_include(dependencies)),
      treeshake: Some(true),
      dir: Some(output_dir.to_path_buf()),
      entry_filenames: Some("[name].js".to_string()),
      chunk_filenames: Some("chunks/[name]-[hash].js".to_string()),
      inline_dynamic_imports: Some(false),
      write: Some(true),
      ..CompileOptions::default()
    };

    let CompileOutput { outputs, warnings } = self.compiler.compile(compile_options).await?;
    for warning in &warnings {
      tracing::warn!("{warning:#}");
    }

    let (file_name_to_dependency_map, used_externals) = {
      let name_to_package = entries
        .iter()
        .map(|(package, entry)| (entry.name.as_str(), package.as_str()))
        .collect::<FxHashMap<_, _>>();
      let chunks = outputs.iter().filter_map(Output::as_chunk).collect::<Vec<_>>();
      let chunk_filenames =
        chunks.iter().map(|chunk| chunk.filename.as_str()).collect::<FxHashSet<_>>();

      let file_name_to_dependency_map = chunks
        .iter()
        .filter(|chunk| chunk.is_entry)
        .filter_map(|chunk| {
          let package = name_to_package.get(chunk.name.as_str())?;
          Some((chunk.filename.to_string(), (*package).to_string()))
        })
        .collect::<FxIndexMap<_, _>>();
      let used_externals = chunks
        .iter()
        .flat_map(|chunk| chunk.imports.iter().chain(&chunk.dynamic_imports))
        .filter(|specifier| !chunk_filenames.contains(specifier.as_str()))
        .cloned()
        .collect::<FxIndexSet<_>>();
      (file_name_to_dependency_map, used_externals)
    };
    tracing::debug!(
      packages = file_name_to_dependency_map.len(),
      externals = used_externals.len(),
      "optimized dependencies"
    );

    Ok(OptimizeOutput { output: outputs, file_name_to_dependency_map, used_externals })
  }
}

#[cfg(test)]
use std::sync::Mutex;
#[cfg(test)]
use trimpack_common::{AnalyzeOptions, DependencyExports, OutputChunk, WorkspacePackageInfo};
#[cfg(test)]
use crate::normalize_options;

#[cfg(test)]
#[derive(Default)]
struct StubCompiler {
  outputs: Vec<Output>,
  calls: Mutex<Vec<CompileOptions>>,
}

#[cfg(test)]
#[async_trait::async_trait]
impl ModuleCompiler for StubCompiler {
  async fn compile(&self, options: CompileOptions) -> BuildResult<CompileOutput> {
    self.calls.lock().unwrap().push(options);
    Ok(CompileOutput { outputs: self.outputs.clone(), warnings: vec![] })
  }
}

#[cfg(test)]
fn chunk(name: &str, filename: &str, is_entry: bool, imports: &[&str]) -> Output {
  Output::Chunk(Box::new(OutputChunk {
    name: name.into(),
    filename: filename.into(),
    is_entry,
    imports: imports.iter().map(ToString::to_string).collect(),
    ..OutputChunk::default()
  }))
}

#[cfg(test)]
fn metadata(names: &[&str], is_workspace: bool) -> DependencyMetadata {
  DependencyMetadata {
    exports: DependencyExports::from(names.iter().map(ToString::to_string).collect::<Vec<_>>()),
    root_path: None,
    is_workspace,
  }
}

#[cfg(test)]
fn options(cwd: &Path, dev: bool) -> NormalizedAnalyzeOptions {
  normalize_options(AnalyzeOptions {
    cwd: Some(cwd.to_path_buf()),
    external: Some(vec!["my-native".to_string()]),
    dev: Some(dev),
    ..AnalyzeOptions::default()
  })
  .unwrap()
}

#[test]
fn test_virtual_entries() {
  let cwd = std::env::temp_dir().join("app");
  let options = options(&cwd, true);
  let mut workspace_map = WorkspaceMap::default();
  workspace_map.insert(
    "@acme/ui".to_string(),
    WorkspacePackageInfo {
      location: std::env::temp_dir().join("packages").join("ui"),
      dependencies: None,
      version: None,
    },
  );
  let compiler = StubCompiler::default();
  let optimizer = DependencyOptimizer::new(&compiler, &options, &workspace_map);

  let mut dependencies = FxIndexMap::default();
  dependencies.insert("@scope/pkg".to_string(), metadata(&["a", "default"], false));
  dependencies.insert("@acme/ui".to_string(), metadata(&["Button"], true));
  dependencies.insert("sharp".to_string(), metadata(&["*"], false));
  dependencies.insert("my-native".to_string(), metadata(&["x"], false));
  dependencies.insert(TOOL_BINDINGS_ALIAS.to_string(), metadata(&["*"], false));

  let entries = optimizer.virtual_entries(&dependencies, &cwd.join("dist"));
  assert_eq!(entries.keys().collect::<Vec<_>>(), vec!["@scope/pkg", "@acme/ui"]);
  assert_eq!(entries["@scope/pkg"].name, "deps/@scope+pkg");
  assert_eq!(
    entries["@scope/pkg"].synthetic_source,
    "export { a, default } from \"@scope/pkg\";\n"
  );
  assert_eq!(entries["@acme/ui"].name, "../../packages/ui/.trimpack/deps/@acme+ui");
}

#[cfg(test)]
#[tokio::test]
async fn test_nothing_to_optimize() {
  let cwd = std::env::temp_dir().join("app");
  let options = options(&cwd, false);
  let workspace_map = WorkspaceMap::default();
  let compiler = StubCompiler::default();
  let mut dependencies = FxIndexMap::default();
  dependencies.insert("sharp".to_string(), metadata(&["default"], false));

  let output = DependencyOptimizer::new(&compiler, &options, &workspace_map)
    .optimize(&dependencies, &cwd.join("dist"))
    .await
    .unwrap();
  assert!(output.output.is_empty());
  assert!(compiler.calls.lock().unwrap().is_empty());
}

#[cfg(test)]
#[tokio::test]
async fn test_maps_chunks_to_packages() {
  let cwd = std::env::temp_dir().join("app");
  let options = options(&cwd, false);
  let workspace_map = WorkspaceMap::default();
  let compiler = StubCompiler {
    outputs: vec![
      chunk("deps/a", "deps/a.js", true, &["chunks/shared-1a2b3c4d.js", "sharp"]),
      chunk("deps/b", "deps/b.js", true, &["chunks/shared-1a2b3c4d.js"]),
      chunk("shared", "chunks/shared-1a2b3c4d.js", false, &["node:fs", "sharp"]),
    ],
    calls: Mutex::default(),
  };
  let mut dependencies = FxIndexMap::default();
  dependencies.insert("a".to_string(), metadata(&["a"], false));
  dependencies.insert("b".to_string(), metadata(&[], false));

  let output = DependencyOptimizer::new(&compiler, &options, &workspace_map)
    .optimize(&dependencies, &cwd.join("dist"))
    .await
    .unwrap();
  assert_eq!(output.file_name_to_dependency_map["deps/a.js"], "a");
  assert_eq!(output.file_name_to_dependency_map["deps/b.js"], "b");
  assert_eq!(output.used_externals.iter().collect::<Vec<_>>(), vec!["sharp", "node:fs"]);

  let calls = compiler.calls.lock().unwrap();
  let call = &calls[0];
  let virtual_modules = call.virtual_modules.as_ref().unwrap();
  assert_eq!(virtual_modules[&virtual_module_id("deps/b")], "import \"b\";\n");
  assert_eq!(call.write, Some(true));
  let Some(ExternalOption::Packages(external)) = &call.external else {
    panic!("externals must be listed");
  };
  assert!(external.iter().any(|name| name == "sharp"));
  assert!(external.iter().any(|name| name == "my-native"));
  assert!(external.iter().any(|name| name == TOOL_BINDINGS_ALIAS));
}
