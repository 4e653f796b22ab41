use sugar_path::SugarPath;
use trimpack_common::{CompileOptions, NormalizedCompileOptions};
use trimpack_error::BuildResult;

pub fn normalize_options(raw_options: CompileOptions) -> BuildResult<NormalizedCompileOptions> {
  let cwd = match raw_options.cwd {
    Some(cwd) => cwd,
    None => std::env::current_dir()?,
  };

  let dir = raw_options.dir.unwrap_or_else(|| cwd.join("dist"));
  let dir = if dir.is_absolute() { dir.normalize() } else { cwd.join(dir).normalize() };

  let alias = raw_options
    .alias
    .unwrap_or_default()
    .into_iter()
    .map(|(specifier, path)| {
      let path = if path.is_absolute() { path } else { cwd.join(path) };
      (specifier, path.normalize())
    })
    .collect();

  Ok(NormalizedCompileOptions {
    input: raw_options.input.unwrap_or_default(),
    platform: raw_options.platform.unwrap_or_default(),
    virtual_modules: raw_options.virtual_modules.unwrap_or_default(),
    alias,
    external: raw_options.external,
    transform_include: raw_options.transform_include.unwrap_or_default(),
    treeshake: raw_options.treeshake.unwrap_or(true),
    dir,
    entry_filenames: raw_options.entry_filenames.unwrap_or_else(|| "[name].js".to_string()),
    chunk_filenames: raw_options
      .chunk_filenames
      .unwrap_or_else(|| "chunks/[name]-[hash].js".to_string()),
    asset_filenames: raw_options
      .asset_filenames
      .unwrap_or_else(|| "assets/[name]-[hash][extname]".to_string()),
    inline_dynamic_imports: raw_options.inline_dynamic_imports.unwrap_or(false),
    write: raw_options.write.unwrap_or(false),
    cwd,
  })
}

#[test]
fn test_defaults() {
  let cwd = std::env::temp_dir().join("project");
  let options =
    normalize_options(CompileOptions { cwd: Some(cwd.clone()), ..CompileOptions::default() })
      .unwrap();
  assert!(options.treeshake);
  assert!(!options.write);
  assert!(!options.inline_dynamic_imports);
  assert_eq!(options.dir, cwd.join("dist"));
  assert_eq!(options.chunk_filenames, "chunks/[name]-[hash].js");
}
