use std::path::Path;

use trimpack_common::{ModuleType, NormalizedCompileOptions, ResolvedId};
use trimpack_fs::FileSystem;

use crate::types::str_or_bytes::StrOrBytes;

/// In-memory modules first, then the file system. Virtual modules are always JavaScript.
pub fn load_source(
  fs: &dyn FileSystem,
  options: &NormalizedCompileOptions,
  resolved_id: &ResolvedId,
) -> anyhow::Result<(StrOrBytes, ModuleType)> {
  if let Some(source) = options.virtual_modules.get(resolved_id.id.as_str()) {
    return Ok((StrOrBytes::Str(source.clone()), ModuleType::Js));
  }

  let path = Path::new(resolved_id.id.as_str());
  let module_type = ModuleType::from_path(path);
  let source = match module_type {
    ModuleType::Asset => StrOrBytes::Bytes(fs.read(path)?),
    _ => StrOrBytes::Str(fs.read_to_string(path)?),
  };
  Ok((source, module_type))
}
