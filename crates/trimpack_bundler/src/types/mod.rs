pub mod linking_metadata;
pub mod str_or_bytes;

use std::sync::Arc;

use oxc_index::IndexVec;
use trimpack_common::{Module, ModuleIdx, NormalizedCompileOptions};
use trimpack_fs::OsFileSystem;
use trimpack_resolver::Resolver;

pub type IndexModules = IndexVec<ModuleIdx, Module>;

pub type SharedResolver = Arc<Resolver<OsFileSystem>>;
pub type SharedOptions = Arc<NormalizedCompileOptions>;
