pub mod chunk_kind;
pub mod dependency_metadata;
pub mod entry_point;
pub mod import_kind;
pub mod import_record;
pub mod module_id;
pub mod module_type;
pub mod output;
pub mod output_asset;
pub mod output_chunk;
pub mod package_json;
pub mod raw_idx;
pub mod resolution_map;
pub mod resolved_id;
pub mod validation_result;
pub mod virtual_dependency_entry;
pub mod workspace_package_info;
