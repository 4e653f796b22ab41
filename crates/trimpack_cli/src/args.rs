use std::path::PathBuf;

use clap::Args;

use crate::types::platform::Platform;

#[derive(Args)]
pub struct InputArgs {
  /// Program entries. Defaults to the main entry.
  pub entries: Vec<PathBuf>,

  /// The entry the workspace is resolved from.
  #[clap(long, short)]
  pub main: Option<PathBuf>,

  #[clap(long)]
  pub cwd: Option<PathBuf>,

  #[clap(long, short)]
  pub platform: Option<Platform>,

  /// A `trimpack.json` file. Flags take precedence over it.
  #[clap(long, short)]
  pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct OutputArgs {
  #[clap(long, short = 'd', default_value = "dist")]
  pub out_dir: PathBuf,

  /// Copy the demoted workspace packages and their workspace dependencies into this directory.
  #[clap(long)]
  pub pack_workspace: Option<PathBuf>,

  #[clap(long, short)]
  pub silent: bool,
}

#[derive(Args)]
pub struct EnhanceArgs {
  /// Never bundle this package.
  #[clap(long, action = clap::ArgAction::Append)]
  pub external: Vec<String>,

  /// Strip TypeScript and JSX from this installed package.
  #[clap(long, action = clap::ArgAction::Append)]
  pub transpile: Vec<String>,

  #[clap(long)]
  pub dev: bool,
}
