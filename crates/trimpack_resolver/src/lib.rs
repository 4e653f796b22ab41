// A wrapper around the `oxc_resolver` crate with the lookups the pipeline needs.

mod resolver;

pub use crate::resolver::{ResolveReturn, Resolver};

pub use oxc_resolver::ResolveError;
