pub mod artifact_loader;

use std::path::Path;

use sugar_path::SugarPath;
use trimpack_common::{Output, ValidationResult, WorkspaceMap};
use trimpack_utils::{indexmap::FxIndexMap, package_name::dependency_identity};

use self::artifact_loader::ArtifactLoader;

/// Loads every optimized entry artifact. A package whose artifact fails to load is demoted to a
/// plain runtime dependency instead of failing the build.
pub struct Validator<'a> {
  loader: &'a dyn ArtifactLoader,
  workspace_map: WorkspaceMap,
}

impl<'a> Validator<'a> {
  pub fn new(loader: &'a dyn ArtifactLoader, workspace_map: WorkspaceMap) -> Self {
    Self { loader, workspace_map }
  }

  /// `reference_map` maps artifact file names to the package they were built for.
  #[tracing::instrument(level = "debug", skip_all, fields(output_dir = %output_dir.display()))]
  pub async fn validate(
    self,
    output: &[Output],
    reference_map: &FxIndexMap<String, String>,
    output_dir: &Path,
  ) -> ValidationResult {
    let mut result = ValidationResult::default();

    let entries = output.iter().filter_map(Output::as_chunk).filter(|chunk| chunk.is_static_entry());
    for chunk in entries {
      let filename = chunk.filename.as_str();
      let path = output_dir.join(filename).normalize();
      let package = reference_map.get(filename);

      match self.loader.load(&path).await {
        Ok(()) => {
          if let Some(package) = package {
            result.resolved_dependency_files.insert(package.clone(), path);
          }
        }
        Err(err) => {
          tracing::warn!(artifact = filename, "artifact failed to load: {err:#}");
          result.invalid_artifacts.insert(filename.to_string());
          if let Some(package) = package {
            result.demoted_external_packages.insert(dependency_identity(package).to_string());
          }
        }
      }
    }

    result.workspace_map = self.workspace_map;
    result
  }
}

#[cfg(test)]
use std::path::PathBuf;
#[cfg(test)]
use async_trait::async_trait;
#[cfg(test)]
use trimpack_common::OutputChunk;

/// Fails for every path containing `broken`.
#[cfg(test)]
struct MockLoader;

#[cfg(test)]
#[async_trait]
impl ArtifactLoader for MockLoader {
  async fn load(&self, path: &Path) -> anyhow::Result<()> {
    if path.to_string_lossy().contains("broken") {
      anyhow::bail!("SyntaxError: Unexpected token");
    }
    Ok(())
  }
}

#[cfg(test)]
fn chunk(filename: &str, is_entry: bool, is_dynamic_entry: bool) -> Output {
  Output::Chunk(Box::new(OutputChunk {
    filename: filename.into(),
    is_entry,
    is_dynamic_entry,
    ..OutputChunk::default()
  }))
}

#[cfg(test)]
#[tokio::test]
async fn test_demotes_failing_packages() {
  let output = vec![
    chunk("deps/left-pad.js", true, false),
    chunk("deps/@scope+broken.js", true, false),
    chunk("chunks/broken-1234abcd.js", false, false),
    chunk("deps/broken-lazy.js", true, true),
  ];
  let reference_map = [
    ("deps/left-pad.js", "left-pad"),
    ("deps/@scope+broken.js", "@scope/broken/sub"),
    ("deps/broken-lazy.js", "broken-lazy"),
  ]
  .into_iter()
  .map(|(file, package)| (file.to_string(), package.to_string()))
  .collect();
  let output_dir = PathBuf::from("/app/dist");

  let result = Validator::new(&MockLoader, WorkspaceMap::default())
    .validate(&output, &reference_map, &output_dir)
    .await;

  assert_eq!(
    result.invalid_artifacts.iter().collect::<Vec<_>>(),
    vec!["deps/@scope+broken.js"]
  );
  assert_eq!(
    result.demoted_external_packages.iter().collect::<Vec<_>>(),
    vec!["@scope/broken"]
  );
  assert_eq!(
    result.resolved_dependency_files.into_iter().collect::<Vec<_>>(),
    vec![("left-pad".to_string(), output_dir.join("deps/left-pad.js"))]
  );
}
