use trimpack_utils::indexmap::FxIndexMap;

/// Output file (relative to the output directory) -> external package -> id of the module that
/// imports it.
pub type ResolutionMap = FxIndexMap<String, FxIndexMap<String, String>>;
