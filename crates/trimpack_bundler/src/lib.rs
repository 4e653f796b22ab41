mod bundler;
mod graph;
mod module_loader;
mod stages;
mod types;
mod utils;

pub use crate::bundler::Bundler;
pub use trimpack_common::*;
