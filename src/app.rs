use crate::config::Config;
use crate::error::AppError;
use crate::services::api::http::HttpApi;
use crate::services::api::ProcessingApi;
use crate::services::archive_saver::{ArchiveSaver, DiskSaver};
use crate::services::connection::ConnectionMonitor;
use crate::services::local_pipeline::LocalPipeline;
use crate::services::remote_pipeline::RemotePipeline;
use std::sync::Arc;

/// Application state shared by every command: one connection monitor and
/// the two independent pipelines, all talking to the same API client.
#[derive(Clone)]
pub struct App {
    pub config: Config,
    pub connection: ConnectionMonitor,
    pub local: LocalPipeline,
    pub remote: RemotePipeline,
}

impl App {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let api: Arc<dyn ProcessingApi> = Arc::new(HttpApi::new(config.clone())?);
        let saver: Arc<dyn ArchiveSaver> = Arc::new(DiskSaver::new(config.download_dir()));
        log::debug!(
            "Using {} with downloads in {}",
            config.api_base_url,
            config.download_dir().display()
        );
        Ok(Self::with_parts(config, api, saver))
    }

    pub fn with_parts(
        config: Config,
        api: Arc<dyn ProcessingApi>,
        saver: Arc<dyn ArchiveSaver>,
    ) -> Self {
        let connection = ConnectionMonitor::new(api.clone());
        Self {
            local: LocalPipeline::new(api.clone(), saver),
            remote: RemotePipeline::new(api, connection.clone()),
            connection,
            config,
        }
    }
}
