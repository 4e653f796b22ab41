use std::path::{Path, PathBuf};

use sugar_path::SugarPath;
use trimpack_bundler::Bundler;
use trimpack_common::{
  AnalyzeOptions, ModuleCompiler, NormalizedAnalyzeOptions, Platform, ValidationResult,
};
use trimpack_error::BuildResult;
use trimpack_fs::OsFileSystem;
use trimpack_resolver::Resolver;
use trimpack_workspace::WorkspaceResolver;

use crate::{
  dependency_optimizer::DependencyOptimizer,
  entry_analyzer::{EntryAnalyzer, EntrySource},
  resolve_map_builder::{write_resolution_map, ResolveMapBuilder},
  utils::normalize_options::normalize_options,
  validator::{
    artifact_loader::{ArtifactLoader, StaticArtifactLoader},
    Validator,
  },
};

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
  if path.is_absolute() { path.normalize() } else { cwd.join(path).normalize() }
}

/// Analyzes `entries`, compiles the packages they use into `output_dir` and writes the
/// `module-resolve-map.json` describing where the remaining externals come from.
pub async fn analyze_bundle(
  entries: &[EntrySource],
  main_entry: &Path,
  output_dir: &Path,
  platform: Platform,
) -> BuildResult<ValidationResult> {
  let options =
    normalize_options(AnalyzeOptions { platform: Some(platform), ..AnalyzeOptions::default() })?;
  let loader = StaticArtifactLoader::from_options(&options);
  analyze_bundle_with(entries, main_entry, output_dir, &options, &Bundler::new(), &loader).await
}

#[tracing::instrument(level = "debug", skip_all, fields(main_entry = %main_entry.display()))]
pub async fn analyze_bundle_with(
  entries: &[EntrySource],
  main_entry: &Path,
  output_dir: &Path,
  options: &NormalizedAnalyzeOptions,
  compiler: &dyn ModuleCompiler,
  loader: &dyn ArtifactLoader,
) -> BuildResult<ValidationResult> {
  let main_entry = absolute(&options.cwd, main_entry);
  let output_dir = absolute(&options.cwd, output_dir);

  let workspace_dir = main_entry.parent().unwrap_or(&options.cwd);
  let workspace = WorkspaceResolver::new(OsFileSystem).resolve(workspace_dir)?;
  tracing::debug!(
    is_workspace_package = workspace.is_workspace_package,
    packages = workspace.workspace_map.len(),
    "resolved workspace"
  );

  let resolver = Resolver::new(options.platform, options.cwd.clone(), OsFileSystem);
  let mut analyzer = EntryAnalyzer::new(compiler, options, &resolver, &workspace.workspace_map);
  for entry in entries {
    analyzer.analyze(entry).await?;
  }
  let dependencies = analyzer.into_dependencies();
  tracing::info!(dependencies = dependencies.len(), "analyzed entries");

  let optimized = DependencyOptimizer::new(compiler, options, &workspace.workspace_map)
    .optimize(&dependencies, &output_dir)
    .await?;

  let externals = optimized.used_externals.iter().collect::<Vec<_>>();
  let resolution_map = ResolveMapBuilder::new(&optimized.output).build(&externals);
  write_resolution_map(&OsFileSystem, &output_dir, &resolution_map)?;

  let result = Validator::new(loader, workspace.workspace_map)
    .validate(&optimized.output, &optimized.file_name_to_dependency_map, &output_dir)
    .await;
  tracing::info!(
    optimized = result.resolved_dependency_files.len(),
    demoted = result.demoted_external_packages.len(),
    "validated artifacts"
  );
  Ok(result)
}
