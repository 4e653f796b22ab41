#[derive(Debug)]
pub enum StrOrBytes {
  Str(String),
  Bytes(Vec<u8>),
}

impl StrOrBytes {
  pub fn try_into_string(self) -> anyhow::Result<String> {
    match self {
      Self::Str(s) => Ok(s),
      Self::Bytes(bytes) => {
        String::from_utf8(bytes).map_err(|_| anyhow::anyhow!("Source is not valid UTF-8"))
      }
    }
  }

  pub fn into_bytes(self) -> Vec<u8> {
    match self {
      Self::Str(s) => s.into_bytes(),
      Self::Bytes(bytes) => bytes,
    }
  }
}

impl From<String> for StrOrBytes {
  fn from(value: String) -> Self {
    Self::Str(value)
  }
}
