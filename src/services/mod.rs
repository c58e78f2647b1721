pub mod api;
pub mod archive_saver;
pub mod connection;
pub mod content;
pub mod fs_service;
pub mod in_flight;
pub mod local_pipeline;
pub mod pipeline;
pub mod remote_pipeline;
pub mod summary;
