use std::{path::Path, sync::Arc};

use anyhow::Context;
use trimpack_common::{CompileOptions, CompileOutput, ModuleCompiler, Output};
use trimpack_error::BuildResult;
use trimpack_fs::{FileSystem, OsFileSystem};
use trimpack_resolver::Resolver;

use crate::{
  stages::{generate::GenerateStage, link::LinkStage, scan::ScanStage},
  types::{SharedOptions, SharedResolver},
  utils::normalize_options::normalize_options,
};

/// Bundles ES modules and CommonJS into ES module chunks. Every call to [`Bundler::build`] is an
/// independent build with its own options and resolver caches.
#[derive(Debug, Default)]
pub struct Bundler {
  fs: OsFileSystem,
}

impl Bundler {
  pub fn new() -> Self {
    Self { fs: OsFileSystem }
  }

  #[tracing::instrument(level = "debug", skip_all)]
  pub async fn build(&self, options: CompileOptions) -> BuildResult<CompileOutput> {
    let options: SharedOptions = Arc::new(normalize_options(options)?);
    let resolver: SharedResolver =
      Arc::new(Resolver::new(options.platform, options.cwd.clone(), self.fs));

    let scan_stage_output =
      ScanStage::new(self.fs, SharedOptions::clone(&options), resolver).scan().await?;
    tracing::debug!(modules = scan_stage_output.module_table.len(), "scanned modules");

    let link_stage_output = LinkStage::new(scan_stage_output).link();
    let outputs = GenerateStage::new(&link_stage_output, &options).generate()?;

    if options.write {
      self.write_outputs(&options.dir, &outputs)?;
    }

    Ok(CompileOutput { outputs, warnings: link_stage_output.warnings })
  }

  fn write_outputs(&self, dir: &Path, outputs: &[Output]) -> BuildResult<()> {
    for output in outputs {
      let dest = dir.join(output.filename());
      self
        .fs
        .write(&dest, output.content_as_bytes())
        .with_context(|| format!("Failed to write {}", dest.display()))?;
    }
    Ok(())
  }
}

#[async_trait::async_trait]
impl ModuleCompiler for Bundler {
  async fn compile(&self, options: CompileOptions) -> BuildResult<CompileOutput> {
    self.build(options).await
  }
}
