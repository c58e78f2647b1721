pub mod http;

use crate::error::AppError;
use crate::models::drive_types::{
    ConnectionStatus, ProcessFolderResponse, RemoteDestination, RemoteFolder,
};
use crate::models::upload_types::{LocalDestination, SelectedFile};
use async_trait::async_trait;

pub const STATUS_PATH: &str = "/auth/gdrive/status";
pub const FILES_PATH: &str = "/auth/gdrive/files";
pub const PROCESS_FOLDER_PATH: &str = "/auth/gdrive/process-folder";
pub const PROCESS_UPLOAD_PATH: &str = "/process-upload";

/// A successful `/process-upload` response, read in binary mode so either
/// an archive or a JSON body can be consumed from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

/// The processing service's HTTP contract. Every call is credentialed.
///
/// Non-2xx responses come back as `AppError` with `status` set and the raw
/// body attached when the server sent one.
#[async_trait]
pub trait ProcessingApi: Send + Sync {
    async fn connection_status(&self) -> Result<ConnectionStatus, AppError>;

    async fn list_folders(&self) -> Result<Vec<RemoteFolder>, AppError>;

    async fn process_folder(
        &self,
        folder_id: &str,
        destination: RemoteDestination,
    ) -> Result<ProcessFolderResponse, AppError>;

    async fn process_upload(
        &self,
        files: &[SelectedFile],
        destination: LocalDestination,
    ) -> Result<RawResponse, AppError>;
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// Scripted `ProcessingApi`: each call pops the next queued reply for
    /// its endpoint and counts itself.
    #[derive(Default)]
    pub struct FakeApi {
        pub status: Mutex<VecDeque<Result<ConnectionStatus, AppError>>>,
        pub folders: Mutex<VecDeque<Result<Vec<RemoteFolder>, AppError>>>,
        pub process: Mutex<VecDeque<Result<ProcessFolderResponse, AppError>>>,
        pub upload: Mutex<VecDeque<Result<RawResponse, AppError>>>,
        pub status_calls: AtomicUsize,
        pub folder_calls: AtomicUsize,
        pub process_calls: Mutex<Vec<(String, RemoteDestination)>>,
        pub upload_calls: Mutex<Vec<(Vec<String>, LocalDestination)>>,
        /// When set, uploads and folder processing wait for a notification
        /// before answering.
        pub gate: Option<Notify>,
    }

    impl FakeApi {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn gated() -> Self {
            Self {
                gate: Some(Notify::new()),
                ..Self::default()
            }
        }

        pub fn release(&self) {
            if let Some(gate) = &self.gate {
                gate.notify_one();
            }
        }

        pub fn push_status(&self, reply: Result<ConnectionStatus, AppError>) {
            self.status.lock().unwrap().push_back(reply);
        }

        pub fn push_folders(&self, reply: Result<Vec<RemoteFolder>, AppError>) {
            self.folders.lock().unwrap().push_back(reply);
        }

        pub fn push_process(&self, reply: Result<ProcessFolderResponse, AppError>) {
            self.process.lock().unwrap().push_back(reply);
        }

        pub fn push_upload(&self, reply: Result<RawResponse, AppError>) {
            self.upload.lock().unwrap().push_back(reply);
        }

        pub fn upload_count(&self) -> usize {
            self.upload_calls.lock().unwrap().len()
        }

        async fn wait_gate(&self) {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
        }
    }

    fn exhausted() -> AppError {
        AppError::from("fake api: no scripted reply")
    }

    #[async_trait]
    impl ProcessingApi for FakeApi {
        async fn connection_status(&self) -> Result<ConnectionStatus, AppError> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            self.status.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))
        }

        async fn list_folders(&self) -> Result<Vec<RemoteFolder>, AppError> {
            self.folder_calls.fetch_add(1, Ordering::SeqCst);
            self.folders.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))
        }

        async fn process_folder(
            &self,
            folder_id: &str,
            destination: RemoteDestination,
        ) -> Result<ProcessFolderResponse, AppError> {
            self.process_calls
                .lock()
                .unwrap()
                .push((folder_id.to_string(), destination));
            self.wait_gate().await;
            self.process.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))
        }

        async fn process_upload(
            &self,
            files: &[SelectedFile],
            destination: LocalDestination,
        ) -> Result<RawResponse, AppError> {
            let names = files.iter().map(|f| f.name.clone()).collect();
            self.upload_calls.lock().unwrap().push((names, destination));
            self.wait_gate().await;
            self.upload.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))
        }
    }
}
