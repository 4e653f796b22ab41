use std::path::{Path, PathBuf};

use trimpack_common::{
  virtual_module_id, CompileOptions, DependencyExports, DependencyMetadata, ExternalOption,
  InputItem, ModuleCompiler, NormalizedAnalyzeOptions, WorkspaceMap, TOOL_BINDINGS_ALIAS,
};
use trimpack_error::BuildResult;
use trimpack_resolver::Resolver;
use trimpack_utils::{
  indexmap::FxIndexMap,
  node_builtins::is_builtin_module,
  package_name::{is_bare_specifier, package_name_of},
};

/// A program entry, either a file on disk or source text that only exists in memory.
#[derive(Debug, Clone)]
pub enum EntrySource {
  Path(PathBuf),
  Inline { id: String, source: String },
}

impl EntrySource {
  pub fn is_inline(&self) -> bool {
    matches!(self, Self::Inline { .. })
  }

  fn display_id(&self) -> String {
    match self {
      Self::Path(path) => path.display().to_string(),
      Self::Inline { id, .. } => id.clone(),
    }
  }
}

#[derive(Debug, Default)]
pub struct EntryAnalysis {
  /// External packages this entry uses.
  pub dependencies: FxIndexMap<String, DependencyMetadata>,
  /// The entry compiled into a single module, externals left as imports.
  pub transformed_source: String,
}

/// Finds the external packages a program uses and the bindings it takes from each. Results of
/// successive [`EntryAnalyzer::analyze`] calls are unioned.
pub struct EntryAnalyzer<'a> {
  compiler: &'a dyn ModuleCompiler,
  options: &'a NormalizedAnalyzeOptions,
  resolver: &'a Resolver,
  workspace_map: &'a WorkspaceMap,
  dependencies: FxIndexMap<String, DependencyMetadata>,
}

impl<'a> EntryAnalyzer<'a> {
  pub fn new(
    compiler: &'a dyn ModuleCompiler,
    options: &'a NormalizedAnalyzeOptions,
    resolver: &'a Resolver,
    workspace_map: &'a WorkspaceMap,
  ) -> Self {
    Self { compiler, options, resolver, workspace_map, dependencies: FxIndexMap::default() }
  }

  #[tracing::instrument(level = "debug", skip_all, fields(entry = %entry.display_id()))]
  pub async fn analyze(&mut self, entry: &EntrySource) -> BuildResult<EntryAnalysis> {
    let output = self.compiler.compile(self.compile_options(entry)).await?;
    let Some(chunk) = output.chunks().find(|chunk| chunk.is_static_entry()) else {
      return Err(
        anyhow::anyhow!("Compiling {} produced no entry chunk", entry.display_id()).into(),
      );
    };

    let mut dependencies: FxIndexMap<String, DependencyMetadata> = FxIndexMap::default();
    for (source, names) in &chunk.imported_bindings {
      if !self.is_candidate(source) {
        continue;
      }
      let exports = DependencyExports::from(names.clone());
      dependencies.entry(source.clone()).or_default().exports.merge(exports);
    }
    // Bindings of a dynamically imported module can't be enumerated.
    for source in chunk.dynamic_imports.iter().filter(|source| self.is_candidate(source)) {
      dependencies.entry(source.clone()).or_default().exports.merge(DependencyExports::All);
    }

    // Packages reached only through `import()` keep no root path and are never treated as
    // workspace packages.
    let from_dir = self.lookup_dir(entry);
    for (name, metadata) in &mut dependencies {
      if name == TOOL_BINDINGS_ALIAS || !chunk.imported_bindings.contains_key(name) {
        continue;
      }
      let package = package_name_of(name).unwrap_or(name);
      metadata.root_path = self.resolver.package_root(package, &from_dir);
      metadata.is_workspace = self.workspace_map.contains_key(package);
    }
    tracing::debug!(dependencies = dependencies.len(), "analyzed entry");

    for (name, metadata) in &dependencies {
      self.dependencies.entry(name.clone()).or_default().merge(metadata.clone());
    }

    Ok(EntryAnalysis { dependencies, transformed_source: chunk.code.clone() })
  }

  /// Union of everything analyzed so far.
  pub fn dependencies(&self) -> &FxIndexMap<String, DependencyMetadata> {
    &self.dependencies
  }

  pub fn into_dependencies(self) -> FxIndexMap<String, DependencyMetadata> {
    self.dependencies
  }

  fn is_candidate(&self, source: &str) -> bool {
    is_bare_specifier(source) && !is_builtin_module(source) && !self.options.is_ignored(source)
  }

  fn entry_path(&self, path: &Path) -> PathBuf {
    if path.is_absolute() { path.to_path_buf() } else { self.options.cwd.join(path) }
  }

  fn lookup_dir(&self, entry: &EntrySource) -> PathBuf {
    match entry {
      EntrySource::Path(path) => self
        .entry_path(path)
        .parent()
        .map_or_else(|| self.options.cwd.clone(), Path::to_path_buf),
      EntrySource::Inline { .. } => self.options.cwd.clone(),
    }
  }

  fn compile_options(&self, entry: &EntrySource) -> CompileOptions {
    let (input, virtual_modules) = match entry {
      EntrySource::Path(path) => {
        (self.entry_path(path).to_string_lossy().into_owned(), FxIndexMap::default())
      }
      EntrySource::Inline { id, source } => {
        let id = virtual_module_id(id);
        let virtual_modules = std::iter::once((id.clone(), source.clone())).collect();
        (id, virtual_modules)
      }
    };

    CompileOptions {
      input: Some(vec![InputItem::named("entry", input)]),
      cwd: Some(self.options.cwd.clone()),
      platform: Some(self.options.platform),
      virtual_modules: Some(virtual_modules),
      alias: Some(
        self
          .options
          .runtime_aliases
          .iter()
          .map(|(specifier, path)| (specifier.clone(), path.clone()))
          .collect(),
      ),
      external: Some(ExternalOption::BareSpecifiers),
      treeshake: Some(true),
      inline_dynamic_imports: Some(true),
      write: Some(false),
      ..CompileOptions::default()
    }
  }
}

#[cfg(test)]
use std::sync::Mutex;
#[cfg(test)]
use trimpack_common::{AnalyzeOptions, CompileOutput, Output, OutputChunk, Platform};
#[cfg(test)]
use trimpack_fs::OsFileSystem;

/// Answers every compile call with a single entry chunk.
#[cfg(test)]
struct StubCompiler {
  imported_bindings: Vec<(&'static str, Vec<&'static str>)>,
  dynamic_imports: Vec<&'static str>,
  calls: Mutex<Vec<CompileOptions>>,
}

#[cfg(test)]
impl StubCompiler {
  fn new(
    imported_bindings: Vec<(&'static str, Vec<&'static str>)>,
    dynamic_imports: Vec<&'static str>,
  ) -> Self {
    Self { imported_bindings, dynamic_imports, calls: Mutex::default() }
  }
}

#[cfg(test)]
#[async_trait::async_trait]
impl ModuleCompiler for StubCompiler {
  async fn compile(&self, options: CompileOptions) -> BuildResult<CompileOutput> {
    self.calls.lock().unwrap().push(options);
    let chunk = OutputChunk {
      name: "entry".into(),
      filename: "entry.js".into(),
      is_entry: true,
      imported_bindings: self
        .imported_bindings
        .iter()
        .map(|(source, names)| {
          (source.to_string(), names.iter().map(ToString::to_string).collect())
        })
        .collect(),
      dynamic_imports: self.dynamic_imports.iter().map(ToString::to_string).collect(),
      code: "export {};\n".to_string(),
      ..OutputChunk::default()
    };
    Ok(CompileOutput { outputs: vec![Output::Chunk(Box::new(chunk))], warnings: vec![] })
  }
}

#[cfg(test)]
fn test_options(dir: &Path) -> NormalizedAnalyzeOptions {
  crate::normalize_options(AnalyzeOptions {
    cwd: Some(dir.to_path_buf()),
    ..AnalyzeOptions::default()
  })
  .unwrap()
}

#[cfg(test)]
#[tokio::test]
async fn test_filters_builtins_and_ignored() {
  let dir = tempfile::tempdir().unwrap();
  let options = test_options(dir.path());
  let resolver = Resolver::new(Platform::Node, dir.path().to_path_buf(), OsFileSystem);
  let workspace_map = WorkspaceMap::default();
  let compiler = StubCompiler::new(
    vec![
      ("left-pad", vec!["foo"]),
      ("node:fs", vec!["readFileSync"]),
      ("path", vec!["join"]),
      ("@trimpack/tools", vec!["*"]),
      ("@trimpack/runtime", vec!["serve"]),
      ("polyfill", vec![]),
    ],
    vec!["plugin-x", "node:worker_threads"],
  );

  let mut analyzer = EntryAnalyzer::new(&compiler, &options, &resolver, &workspace_map);
  let analysis = analyzer.analyze(&EntrySource::Path("src/a.ts".into())).await.unwrap();
  assert_eq!(
    analysis.dependencies.keys().collect::<Vec<_>>(),
    vec!["left-pad", "polyfill", "plugin-x"]
  );
  assert_eq!(analysis.dependencies["left-pad"].exports.to_vec(), vec!["foo"]);
  assert_eq!(analysis.dependencies["polyfill"].exports, DependencyExports::default());
  assert!(analysis.dependencies["plugin-x"].exports.is_all());
  assert!(analysis.dependencies["plugin-x"].root_path.is_none());
  assert_eq!(analysis.transformed_source, "export {};\n");

  let calls = compiler.calls.lock().unwrap();
  let call = &calls[0];
  assert_eq!(call.treeshake, Some(true));
  assert_eq!(call.inline_dynamic_imports, Some(true));
  assert_eq!(call.input.as_ref().unwrap()[0].import, dir.path().join("src/a.ts").to_string_lossy());
}

#[cfg(test)]
#[tokio::test]
async fn test_dynamic_only_packages_have_no_root() {
  let dir = tempfile::tempdir().unwrap();
  let manifest = dir.path().join("node_modules/plugin-x/package.json");
  std::fs::create_dir_all(manifest.parent().unwrap()).unwrap();
  std::fs::write(&manifest, r#"{ "name": "plugin-x", "main": "index.js" }"#).unwrap();
  std::fs::write(dir.path().join("node_modules/plugin-x/index.js"), "export {};\n").unwrap();

  let options = test_options(dir.path());
  let resolver = Resolver::new(Platform::Node, dir.path().to_path_buf(), OsFileSystem);
  let mut workspace_map = WorkspaceMap::default();
  workspace_map.insert(
    "@acme/ui".to_string(),
    trimpack_common::WorkspacePackageInfo {
      location: dir.path().join("packages/ui"),
      dependencies: None,
      version: Some("1.0.0".to_string()),
    },
  );
  let compiler = StubCompiler::new(vec![], vec!["plugin-x", "@acme/ui"]);

  let mut analyzer = EntryAnalyzer::new(&compiler, &options, &resolver, &workspace_map);
  let analysis = analyzer.analyze(&EntrySource::Path("main.js".into())).await.unwrap();
  for name in ["plugin-x", "@acme/ui"] {
    let metadata = &analysis.dependencies[name];
    assert!(metadata.exports.is_all());
    assert_eq!(metadata.root_path, None);
    assert!(!metadata.is_workspace);
  }
}

#[cfg(test)]
#[tokio::test]
async fn test_inline_entry_is_virtual() {
  let dir = tempfile::tempdir().unwrap();
  let options = test_options(dir.path());
  let resolver = Resolver::new(Platform::Node, dir.path().to_path_buf(), OsFileSystem);
  let workspace_map = WorkspaceMap::default();
  let compiler = StubCompiler::new(vec![], vec![]);

  let entry = EntrySource::Inline { id: "server".to_string(), source: "export {}".to_string() };
  assert!(entry.is_inline());
  EntryAnalyzer::new(&compiler, &options, &resolver, &workspace_map).analyze(&entry).await.unwrap();

  let calls = compiler.calls.lock().unwrap();
  let call = &calls[0];
  let id = virtual_module_id("server");
  assert_eq!(call.input.as_ref().unwrap()[0].import, id);
  assert_eq!(call.virtual_modules.as_ref().unwrap()[&id], "export {}");
}

#[cfg(test)]
#[tokio::test]
async fn test_union_across_entries() {
  let dir = tempfile::tempdir().unwrap();
  let options = test_options(dir.path());
  let resolver = Resolver::new(Platform::Node, dir.path().to_path_buf(), OsFileSystem);
  let workspace_map = WorkspaceMap::default();
  let first = StubCompiler::new(vec![("pkg", vec!["a"])], vec![]);
  let second = StubCompiler::new(vec![("pkg", vec!["b"])], vec![]);
  let dynamic = StubCompiler::new(vec![], vec!["pkg"]);

  let mut analyzer = EntryAnalyzer::new(&first, &options, &resolver, &workspace_map);
  let entry = EntrySource::Path("a.js".into());
  analyzer.analyze(&entry).await.unwrap();
  analyzer.analyze(&entry).await.unwrap();
  assert_eq!(analyzer.dependencies()["pkg"].exports.to_vec(), vec!["a"]);

  analyzer.compiler = &second;
  analyzer.analyze(&EntrySource::Path("b.js".into())).await.unwrap();
  assert_eq!(analyzer.dependencies()["pkg"].exports.to_vec(), vec!["a", "b"]);

  analyzer.compiler = &dynamic;
  analyzer.analyze(&EntrySource::Path("c.js".into())).await.unwrap();
  assert_eq!(analyzer.into_dependencies()["pkg"].exports.to_vec(), vec!["*"]);
}
