mod ecma_compiler;

pub use crate::ecma_compiler::{EcmaCompiler, source_type_for};
