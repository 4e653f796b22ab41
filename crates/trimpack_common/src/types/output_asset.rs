use arcstr::ArcStr;

#[derive(Debug, Clone)]
pub struct OutputAsset {
  pub filename: ArcStr,
  pub source: Vec<u8>,
}
