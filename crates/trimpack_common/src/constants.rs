/// Ids of synthesized in-memory modules start with this marker. The NUL byte keeps them from
/// ever colliding with a real path or package name.
pub const VIRTUAL_MODULE_PREFIX: &str = "\0virtual:";

/// Generated bindings of the deployment runtime's tools. Always resolved by the runtime itself.
pub const TOOL_BINDINGS_ALIAS: &str = "@trimpack/tools";

/// Entry points of the deployment runtime that user code may import. They are aliased to real
/// files while analyzing and never recorded as dependencies.
pub const RUNTIME_ENTRY_ALIASES: &[&str] = &["@trimpack/runtime", "@trimpack/runtime/server"];

pub const MODULE_RESOLVE_MAP_FILENAME: &str = "module-resolve-map.json";
