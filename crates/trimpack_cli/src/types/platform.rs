use clap::ValueEnum;

#[derive(PartialEq, Eq, Clone, Copy, ValueEnum)]
#[clap(rename_all = "lower")]
pub enum Platform {
  Node,
  Browser,
  Neutral,
}

impl From<Platform> for trimpack::Platform {
  fn from(value: Platform) -> Self {
    match value {
      Platform::Node => trimpack::Platform::Node,
      Platform::Browser => trimpack::Platform::Browser,
      Platform::Neutral => trimpack::Platform::Neutral,
    }
  }
}
