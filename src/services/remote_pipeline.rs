use crate::error::AppError;
use crate::models::drive_types::{ProcessFolderResponse, RemoteDestination, RemoteFolder};
use crate::models::pipeline_types::{OperationPhase, PipelineSnapshot, RemoteStage};
use crate::models::result_types::OperationResult;
use crate::services::api::ProcessingApi;
use crate::services::connection::ConnectionMonitor;
use crate::services::in_flight::InFlight;
use crate::services::pipeline::{lock_state, with_output_note};
use std::sync::{Arc, Mutex};

pub const MSG_SELECT_FOLDER: &str = "Select a folder to process.";
pub const MSG_NO_FOLDERS: &str = "No folders found in root.";
pub const MSG_SOURCE_DISCONNECTED: &str = "Error: Source Account disconnected.";
pub const MSG_FETCH_FAILED: &str = "Failed to fetch folders.";
pub const MSG_PROCESSING_COMPLETE: &str = "Processing complete.";
pub const MSG_DESTINATION_DISCONNECTED: &str = "Error: Destination not connected.";
pub const MSG_PROCESS_FAILED: &str = "Error processing folder.";

#[derive(Debug, Default)]
pub struct RemotePipelineState {
    folders: Vec<RemoteFolder>,
    destination: RemoteDestination,
    message: String,
    results: OperationResult,
    outcome: OperationPhase,
}

impl RemotePipelineState {
    pub fn set_destination(&mut self, destination: RemoteDestination) {
        self.destination = destination;
    }

    pub fn destination(&self) -> RemoteDestination {
        self.destination
    }

    pub fn folders(&self) -> &[RemoteFolder] {
        &self.folders
    }

    pub fn begin_fetch(&mut self) {
        self.folders.clear();
        self.message.clear();
        self.outcome = OperationPhase::Idle;
    }

    /// The listing is replaced wholesale; an empty one is a valid answer.
    pub fn finish_fetch(&mut self, folders: Vec<RemoteFolder>) {
        self.message = if folders.is_empty() {
            MSG_NO_FOLDERS
        } else {
            MSG_SELECT_FOLDER
        }
        .to_string();
        self.folders = folders;
    }

    pub fn fail_fetch(&mut self, err: &AppError) {
        self.message = if err.is_auth() {
            MSG_SOURCE_DISCONNECTED
        } else {
            MSG_FETCH_FAILED
        }
        .to_string();
        self.outcome = OperationPhase::Failed;
    }

    /// Start processing a folder. Returns the destination the request must
    /// carry, fixed for the rest of the run.
    pub fn begin_process(&mut self, folder_name: &str) -> RemoteDestination {
        self.results = OperationResult::new();
        self.message = format!("Processing folder: \"{}\"...", folder_name);
        self.outcome = OperationPhase::Idle;
        self.destination
    }

    pub fn finish_process(&mut self, destination: RemoteDestination, response: ProcessFolderResponse) {
        let message = response
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| MSG_PROCESSING_COMPLETE.to_string());
        self.message = with_output_note(&message, destination.writes_to_drive());
        self.results = response.results.unwrap_or_default();
        self.outcome = OperationPhase::Succeeded;
    }

    pub fn fail_process(&mut self, destination: RemoteDestination, err: &AppError) {
        self.message = if err.is_auth() && destination == RemoteDestination::DifferentDrive {
            MSG_DESTINATION_DISCONNECTED
        } else {
            MSG_PROCESS_FAILED
        }
        .to_string();
        self.results = OperationResult::new();
        self.outcome = OperationPhase::Failed;
    }

    pub fn snapshot(&self, loading: bool) -> PipelineSnapshot {
        PipelineSnapshot {
            phase: if loading {
                OperationPhase::Loading
            } else {
                self.outcome
            },
            loading,
            message: self.message.clone(),
            results: self.results.clone(),
            saved_to: None,
        }
    }
}

/// Drives a connected drive folder through `/auth/gdrive/process-folder`.
#[derive(Clone)]
pub struct RemotePipeline {
    state: Arc<Mutex<RemotePipelineState>>,
    fetching: InFlight,
    processing: InFlight,
    api: Arc<dyn ProcessingApi>,
    connection: ConnectionMonitor,
}

impl RemotePipeline {
    pub fn new(api: Arc<dyn ProcessingApi>, connection: ConnectionMonitor) -> Self {
        Self {
            state: Arc::new(Mutex::new(RemotePipelineState::default())),
            fetching: InFlight::new(),
            processing: InFlight::new(),
            api,
            connection,
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut RemotePipelineState) -> R) -> R {
        f(&mut lock_state(&self.state))
    }

    pub fn set_destination(&self, destination: RemoteDestination) {
        self.with_state(|s| s.set_destination(destination));
    }

    pub fn destination(&self) -> RemoteDestination {
        self.with_state(|s| s.destination())
    }

    pub fn folders(&self) -> Vec<RemoteFolder> {
        self.with_state(|s| s.folders().to_vec())
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching.is_active()
    }

    pub fn is_processing(&self) -> bool {
        self.processing.is_active()
    }

    /// Fetching needs a connected source and no fetch already running.
    pub fn can_fetch(&self) -> bool {
        self.connection.current().source_connected && !self.is_fetching()
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        let loading = self.is_fetching() || self.is_processing();
        self.with_state(|s| s.snapshot(loading))
    }

    pub fn stage(&self) -> RemoteStage {
        if self.is_processing() {
            return RemoteStage::Processing;
        }
        if self.is_fetching() {
            return RemoteStage::FetchingFolders;
        }
        let connected = self.connection.current().source_connected;
        self.with_state(|s| match s.outcome {
            OperationPhase::Succeeded => RemoteStage::Succeeded,
            OperationPhase::Failed => RemoteStage::Failed,
            _ if !s.folders.is_empty() => RemoteStage::FoldersLoaded,
            _ if connected => RemoteStage::Connected,
            _ => RemoteStage::Disconnected,
        })
    }

    /// Load the source drive's top-level folders. Refused without a request
    /// when the source is not connected or a fetch is running.
    pub async fn fetch_folders(&self) -> Result<PipelineSnapshot, AppError> {
        if !self.connection.current().source_connected {
            return Err(AppError::unavailable(
                "Source account is not connected; connect it before fetching folders.",
            ));
        }
        let guard = self
            .fetching
            .try_acquire()
            .ok_or_else(|| AppError::unavailable("Folders are already being fetched."))?;

        self.with_state(RemotePipelineState::begin_fetch);
        match self.api.list_folders().await {
            Ok(folders) => {
                log::info!("Fetched {} folder(s)", folders.len());
                self.with_state(|s| s.finish_fetch(folders));
            }
            Err(e) => {
                log::warn!("Fetching folders failed: {}", e);
                self.with_state(|s| s.fail_fetch(&e));
            }
        }

        drop(guard);
        Ok(self.snapshot())
    }

    /// Classify one folder. Only one folder is processed at a time.
    pub async fn process_folder(
        &self,
        folder_id: &str,
        folder_name: &str,
    ) -> Result<PipelineSnapshot, AppError> {
        let guard = self
            .processing
            .try_acquire()
            .ok_or_else(|| AppError::unavailable("A folder is already being processed."))?;

        let destination = self.with_state(|s| s.begin_process(folder_name));
        log::info!(
            "Processing folder {} ({}), destination {}",
            folder_name,
            folder_id,
            destination
        );

        match self.api.process_folder(folder_id, destination).await {
            Ok(response) => {
                self.with_state(|s| s.finish_process(destination, response));
                log::info!("Folder {} processed", folder_name);
            }
            Err(e) => {
                log::warn!("Processing folder {} failed: {}", folder_name, e);
                self.with_state(|s| s.fail_process(destination, &e));
            }
        }

        drop(guard);
        Ok(self.snapshot())
    }
}
