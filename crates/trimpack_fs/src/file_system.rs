use std::{
  io,
  path::{Path, PathBuf},
};

/// The file system seen by the compiler, the workspace scanner and the artifact loader.
pub trait FileSystem: Send + Sync {
  fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

  fn read_to_string(&self, path: &Path) -> io::Result<String>;

  fn write(&self, path: &Path, content: &[u8]) -> io::Result<()>;

  fn create_dir_all(&self, path: &Path) -> io::Result<()>;

  /// Entries of `path`, sorted so callers observe a stable order across platforms.
  fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

  fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

  fn exists(&self, path: &Path) -> bool;

  fn is_file(&self, path: &Path) -> bool;

  fn is_dir(&self, path: &Path) -> bool;
}
