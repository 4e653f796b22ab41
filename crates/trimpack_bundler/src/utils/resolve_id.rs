use std::path::Path;

use trimpack_common::{ImportKind, NormalizedCompileOptions, ResolvedId, VIRTUAL_MODULE_PREFIX};
use trimpack_fs::FileSystem;
use trimpack_resolver::Resolver;
use trimpack_utils::node_builtins::is_builtin_module;

use super::package_json_cache::PackageJsonCache;

#[inline]
fn is_http_url(s: &str) -> bool {
  s.starts_with("http://") || s.starts_with("https://") || s.starts_with("//")
}

#[inline]
fn is_data_url(s: &str) -> bool {
  s.trim_start().starts_with("data:")
}

pub struct ResolveIdArgs<'a> {
  pub fs: &'a dyn FileSystem,
  pub options: &'a NormalizedCompileOptions,
  pub resolver: &'a Resolver,
  pub package_json_cache: &'a PackageJsonCache,
}

/// Order: virtual modules, aliases, URLs, node builtins, configured externals, then the file
/// system resolver.
pub fn resolve_id(
  args: &ResolveIdArgs,
  request: &str,
  importer: Option<&str>,
  import_kind: ImportKind,
  is_user_defined_entry: bool,
) -> anyhow::Result<ResolvedId> {
  let ResolveIdArgs { fs, options, resolver, package_json_cache } = args;

  if options.virtual_modules.contains_key(request) {
    return Ok(ResolvedId { id: request.into(), is_external: false, package_json: None });
  }

  if request.starts_with(VIRTUAL_MODULE_PREFIX) {
    anyhow::bail!("Virtual module {:?} is not registered", request.replace('\0', "\\0"));
  }

  if let Some((_, path)) = options.alias.iter().find(|(specifier, _)| specifier == request) {
    return Ok(ResolvedId {
      id: path.to_string_lossy().as_ref().into(),
      is_external: false,
      package_json: package_json_cache.nearest(*fs, path),
    });
  }

  // Auto external http url or data url
  if is_http_url(request) || is_data_url(request) {
    return Ok(ResolvedId::external(request));
  }

  if is_builtin_module(request) || options.is_external(request) {
    return Ok(ResolvedId::external(request));
  }

  let importer = importer.filter(|importer| !importer.starts_with(VIRTUAL_MODULE_PREFIX));
  let resolved = resolver
    .resolve(importer.map(Path::new), request, import_kind, is_user_defined_entry)
    .map_err(|err| anyhow::anyhow!("Could not resolve {request:?}: {err}"))?;

  Ok(ResolvedId {
    package_json: package_json_cache.nearest(*fs, Path::new(resolved.path.as_str())),
    id: resolved.path,
    is_external: false,
  })
}
