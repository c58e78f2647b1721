pub mod drive_types;
pub mod pipeline_types;
pub mod result_types;
pub mod upload_types;
