pub mod load_source;
pub mod normalize_options;
pub mod package_json_cache;
pub mod resolve_id;
