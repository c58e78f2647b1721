use crate::error::AppError;
use crate::models::pipeline_types::{OperationPhase, PipelineSnapshot};
use crate::models::result_types::OperationResult;
use crate::models::upload_types::{LocalDestination, SelectedFileSet};
use crate::services::api::{ProcessingApi, RawResponse};
use crate::services::archive_saver::ArchiveSaver;
use crate::services::content::{self, UploadResponse};
use crate::services::in_flight::InFlight;
use crate::services::pipeline::{lock_state, with_output_note};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub const MSG_SELECT_FIRST: &str = "Error: Please select files or a folder first!";
pub const MSG_DOWNLOAD_STARTED: &str = "Download started: your categorized files are ready.";
pub const MSG_SAVED_TO_DRIVE: &str = "Processing complete! Files saved to Google Drive.";
pub const MSG_UPLOAD_FAILED: &str = "Error: Could not process the upload.";

/// What a submission sends, captured when it starts.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub files: Arc<SelectedFileSet>,
    pub destination: LocalDestination,
}

/// Local-file pipeline state and its transitions. Message, results and the
/// saved path always describe the same run: every transition sets all three.
#[derive(Debug, Default)]
pub struct LocalPipelineState {
    files: Arc<SelectedFileSet>,
    destination: LocalDestination,
    message: String,
    results: OperationResult,
    saved_to: Option<PathBuf>,
    outcome: OperationPhase,
}

impl LocalPipelineState {
    fn reset_run(&mut self, message: String, outcome: OperationPhase) {
        self.message = message;
        self.results = OperationResult::new();
        self.saved_to = None;
        self.outcome = outcome;
    }

    pub fn select_files(&mut self, files: SelectedFileSet) {
        self.files = Arc::new(files);
        self.reset_run(String::new(), OperationPhase::Idle);
    }

    pub fn clear_selection(&mut self) {
        self.select_files(SelectedFileSet::default());
    }

    pub fn set_destination(&mut self, destination: LocalDestination) {
        self.destination = destination;
    }

    pub fn destination(&self) -> LocalDestination {
        self.destination
    }

    pub fn selected(&self) -> &SelectedFileSet {
        &self.files
    }

    /// Start a run. An empty selection fails here, before any request.
    pub fn begin(&mut self) -> Result<UploadRequest, AppError> {
        if self.files.is_empty() {
            self.reset_run(MSG_SELECT_FIRST.to_string(), OperationPhase::Failed);
            return Err(AppError::validation(MSG_SELECT_FIRST));
        }

        self.reset_run(
            format!("Processing {} item(s)...", self.files.len()),
            OperationPhase::Idle,
        );
        Ok(UploadRequest {
            files: self.files.clone(),
            destination: self.destination,
        })
    }

    pub fn finish_download(&mut self, saved_to: PathBuf) {
        self.reset_run(MSG_DOWNLOAD_STARTED.to_string(), OperationPhase::Succeeded);
        self.saved_to = Some(saved_to);
    }

    pub fn finish_results(&mut self, results: OperationResult) {
        self.reset_run(
            with_output_note(MSG_SAVED_TO_DRIVE, true),
            OperationPhase::Succeeded,
        );
        self.results = results;
    }

    pub fn fail(&mut self, message: String) {
        self.reset_run(message, OperationPhase::Failed);
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
            saved_to: self.saved_to.clone(),
        }
    }
}

/// Drives local selections through `/process-upload`.
#[derive(Clone)]
pub struct LocalPipeline {
    state: Arc<Mutex<LocalPipelineState>>,
    in_flight: InFlight,
    api: Arc<dyn ProcessingApi>,
    saver: Arc<dyn ArchiveSaver>,
}

impl LocalPipeline {
    pub fn new(api: Arc<dyn ProcessingApi>, saver: Arc<dyn ArchiveSaver>) -> Self {
        Self {
            state: Arc::new(Mutex::new(LocalPipelineState::default())),
            in_flight: InFlight::new(),
            api,
            saver,
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut LocalPipelineState) -> R) -> R {
        f(&mut lock_state(&self.state))
    }

    pub fn select_files(&self, files: SelectedFileSet) {
        self.with_state(|s| s.select_files(files));
    }

    pub fn clear_selection(&self) {
        self.with_state(LocalPipelineState::clear_selection);
    }

    pub fn set_destination(&self, destination: LocalDestination) {
        self.with_state(|s| s.set_destination(destination));
    }

    pub fn destination(&self) -> LocalDestination {
        self.with_state(|s| s.destination())
    }

    pub fn selected_count(&self) -> usize {
        self.with_state(|s| s.selected().len())
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_active()
    }

    /// Whether the submit affordance is enabled.
    pub fn can_submit(&self) -> bool {
        !self.is_loading() && self.selected_count() > 0
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        let loading = self.is_loading();
        self.with_state(|s| s.snapshot(loading))
    }

    /// Submit the current selection. Outcomes of the run, failures included,
    /// land in the snapshot; `Err` only means the pipeline was busy.
    pub async fn submit(&self) -> Result<PipelineSnapshot, AppError> {
        let guard = self
            .in_flight
            .try_acquire()
            .ok_or_else(|| AppError::unavailable("An upload is already in progress."))?;

        self.run_submit().await;

        drop(guard);
        Ok(self.snapshot())
    }

    async fn run_submit(&self) {
        let request = match self.with_state(LocalPipelineState::begin) {
            Ok(request) => request,
            Err(e) => {
                log::warn!("Upload rejected: {}", e);
                return;
            }
        };

        log::info!(
            "Uploading {} file(s), destination {}",
            request.files.len(),
            request.destination
        );

        match self
            .api
            .process_upload(request.files.files(), request.destination)
            .await
        {
            Ok(raw) => self.consume_response(request.destination, raw).await,
            Err(e) => self.fail_from_error(e).await,
        }
    }

    async fn consume_response(&self, destination: LocalDestination, raw: RawResponse) {
        match content::decode_upload_response(destination, raw, Utc::now()) {
            Ok(UploadResponse::Archive {
                bytes,
                filename,
                content_type,
            }) => match self.saver.save(&filename, &content_type, &bytes).await {
                Ok(path) => {
                    log::info!("Upload finished, archive saved to {}", path.display());
                    self.with_state(|s| s.finish_download(path));
                }
                Err(e) => {
                    log::warn!("Could not save archive {}: {}", filename, e);
                    self.with_state(|s| s.fail(MSG_UPLOAD_FAILED.to_string()));
                }
            },
            Ok(UploadResponse::ResultSet(results)) => {
                log::info!("Upload finished, {} result(s)", results.len());
                self.with_state(|s| s.finish_results(results));
            }
            Err(e) => {
                log::warn!("Unreadable upload response: {}", e);
                self.with_state(|s| s.fail(MSG_UPLOAD_FAILED.to_string()));
            }
        }
    }

    async fn fail_from_error(&self, err: AppError) {
        log::warn!("Upload failed: {}", err);
        let message = content::error_message_from_body(err.body)
            .await
            .unwrap_or_else(|| MSG_UPLOAD_FAILED.to_string());
        self.with_state(|s| s.fail(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::result_types::Prediction;
    use crate::models::upload_types::SelectedFile;
    use crate::services::api::fake::FakeApi;
    use crate::services::archive_saver::DiskSaver;
    use crate::services::pipeline::OUTPUT_FOLDER_NOTE;
    use async_trait::async_trait;

    struct FailingSaver;

    #[async_trait]
    impl ArchiveSaver for FailingSaver {
        async fn save(&self, _: &str, _: &str, _: &[u8]) -> Result<PathBuf, AppError> {
            Err("disk full".into())
        }
    }

    fn three_files() -> SelectedFileSet {
        ["a.jpg", "b.jpg", "c.png"]
            .iter()
            .map(|n| SelectedFile::new(*n, n.as_bytes().to_vec()))
            .collect()
    }

    fn pipeline(api: Arc<FakeApi>, dir: &tempfile::TempDir) -> LocalPipeline {
        LocalPipeline::new(api, Arc::new(DiskSaver::new(dir.path())))
    }

    fn json(body: &str) -> RawResponse {
        RawResponse {
            status: 200,
            content_type: Some("application/json".into()),
            content_disposition: None,
            body: body.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn empty_selection_never_calls_the_service() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(FakeApi::new());
        let local = pipeline(api.clone(), &dir);

        assert!(!local.can_submit());
        let snap = local.submit().await.unwrap();

        assert_eq!(api.upload_count(), 0);
        assert_eq!(snap.message, MSG_SELECT_FIRST);
        assert_eq!(snap.phase, OperationPhase::Failed);
        assert!(!snap.loading);
        assert!(snap.results.is_empty());
    }

    #[tokio::test]
    async fn download_uses_content_disposition_name() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(FakeApi::new());
        api.push_upload(Ok(RawResponse {
            status: 200,
            content_type: None,
            content_disposition: Some(r#"attachment; filename="out.zip""#.into()),
            body: b"PK\x03\x04".to_vec(),
        }));
        let local = pipeline(api.clone(), &dir);
        local.select_files(three_files());

        let snap = local.submit().await.unwrap();

        let calls = api.upload_calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, vec!["a.jpg", "b.jpg", "c.png"]);
        assert_eq!(calls[0].1, LocalDestination::Download);

        assert_eq!(snap.phase, OperationPhase::Succeeded);
        assert_eq!(snap.message, MSG_DOWNLOAD_STARTED);
        assert!(snap.results.is_empty());
        assert_eq!(snap.saved_to, Some(dir.path().join("out.zip")));
        assert_eq!(std::fs::read(dir.path().join("out.zip")).unwrap(), b"PK\x03\x04");
    }

    #[tokio::test]
    async fn download_without_header_gets_timestamped_name() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(FakeApi::new());
        api.push_upload(Ok(RawResponse {
            status: 200,
            body: b"zip".to_vec(),
            ..RawResponse::default()
        }));
        let local = pipeline(api, &dir);
        local.select_files(three_files());

        let snap = local.submit().await.unwrap();

        let saved = snap.saved_to.unwrap();
        let name = saved.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("PixClad_Output_"), "{}", name);
        assert!(name.ends_with(".zip"));
    }

    #[tokio::test]
    async fn drive_destination_adopts_results() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(FakeApi::new());
        api.push_upload(Ok(json(
            r#"{"message":"Processing complete","results":{"a.jpg":[{"name":"Cats","conf":"0.92"}]}}"#,
        )));
        let local = pipeline(api.clone(), &dir);
        local.select_files(three_files());
        local.set_destination(LocalDestination::RemoteDrive);

        let snap = local.submit().await.unwrap();

        assert_eq!(api.upload_calls.lock().unwrap()[0].1, LocalDestination::RemoteDrive);
        assert_eq!(snap.phase, OperationPhase::Succeeded);
        assert_eq!(snap.message, format!("{}{}", MSG_SAVED_TO_DRIVE, OUTPUT_FOLDER_NOTE));
        assert_eq!(snap.results.len(), 1);
        assert_eq!(snap.results["a.jpg"], vec![Prediction::new("Cats", "0.92")]);
        assert_eq!(snap.saved_to, None);
    }

    #[tokio::test]
    async fn drive_destination_without_results_is_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(FakeApi::new());
        api.push_upload(Ok(json(r#"{"message":"ok"}"#)));
        let local = pipeline(api, &dir);
        local.select_files(three_files());
        local.set_destination(LocalDestination::RemoteDrive);

        let snap = local.submit().await.unwrap();
        assert_eq!(snap.phase, OperationPhase::Succeeded);
        assert!(snap.results.is_empty());
    }

    #[tokio::test]
    async fn error_field_of_failure_body_becomes_message() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(FakeApi::new());
        api.push_upload(Err(AppError::http(
            401,
            Some(br#"{"error":"Google Drive not connected"}"#.to_vec()),
        )));
        let local = pipeline(api, &dir);
        local.select_files(three_files());
        local.set_destination(LocalDestination::RemoteDrive);

        let snap = local.submit().await.unwrap();
        assert_eq!(snap.phase, OperationPhase::Failed);
        assert_eq!(snap.message, "Google Drive not connected");
        assert!(!snap.loading);
        assert!(!local.is_loading());
    }

    #[tokio::test]
    async fn binary_failure_body_gets_generic_message() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(FakeApi::new());
        api.push_upload(Err(AppError::http(500, Some(vec![0x50, 0x4b, 0xff, 0x00]))));
        let local = pipeline(api, &dir);
        local.select_files(three_files());

        let snap = local.submit().await.unwrap();
        assert_eq!(snap.message, MSG_UPLOAD_FAILED);
        assert_eq!(snap.phase, OperationPhase::Failed);
    }

    #[tokio::test]
    async fn transport_failure_gets_generic_message() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(FakeApi::new());
        api.push_upload(Err(AppError::new(ErrorKind::Transport, "connection refused")));
        let local = pipeline(api, &dir);
        local.select_files(three_files());

        let snap = local.submit().await.unwrap();
        assert_eq!(snap.message, MSG_UPLOAD_FAILED);
    }

    #[tokio::test]
    async fn undecodable_success_body_gets_generic_message() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(FakeApi::new());
        api.push_upload(Ok(RawResponse {
            status: 200,
            body: vec![0xde, 0xad],
            ..RawResponse::default()
        }));
        let local = pipeline(api, &dir);
        local.select_files(three_files());
        local.set_destination(LocalDestination::RemoteDrive);

        let snap = local.submit().await.unwrap();
        assert_eq!(snap.message, MSG_UPLOAD_FAILED);
        assert!(snap.results.is_empty());
    }

    #[tokio::test]
    async fn save_failure_is_reported_not_propagated() {
        let api = Arc::new(FakeApi::new());
        api.push_upload(Ok(RawResponse {
            status: 200,
            body: b"zip".to_vec(),
            ..RawResponse::default()
        }));
        let local = LocalPipeline::new(api, Arc::new(FailingSaver));
        local.select_files(three_files());

        let snap = local.submit().await.unwrap();
        assert_eq!(snap.phase, OperationPhase::Failed);
        assert_eq!(snap.message, MSG_UPLOAD_FAILED);
        assert_eq!(snap.saved_to, None);
    }

    #[tokio::test]
    async fn second_submit_is_blocked_while_loading() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(FakeApi::gated());
        api.push_upload(Ok(json(r#"{"results":{}}"#)));
        let local = pipeline(api.clone(), &dir);
        local.select_files(three_files());
        local.set_destination(LocalDestination::RemoteDrive);

        let running = {
            let local = local.clone();
            tokio::spawn(async move { local.submit().await })
        };
        while api.upload_count() == 0 {
            tokio::task::yield_now().await;
        }

        let snap = local.snapshot();
        assert!(snap.loading);
        assert_eq!(snap.phase, OperationPhase::Loading);
        assert_eq!(snap.message, "Processing 3 item(s)...");
        assert!(!local.can_submit());

        let blocked = local.submit().await.unwrap_err();
        assert_eq!(blocked.kind, ErrorKind::Unavailable);

        api.release();
        let snap = running.await.unwrap().unwrap();
        assert_eq!(snap.phase, OperationPhase::Succeeded);
        assert_eq!(api.upload_count(), 1);
        assert!(local.can_submit());
    }

    #[tokio::test]
    async fn new_selection_clears_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(FakeApi::new());
        api.push_upload(Ok(json(r#"{"results":{"a.jpg":[]}}"#)));
        let local = pipeline(api, &dir);
        local.select_files(three_files());
        local.set_destination(LocalDestination::RemoteDrive);
        local.submit().await.unwrap();

        local.select_files(three_files());
        let snap = local.snapshot();
        assert_eq!(snap.phase, OperationPhase::Idle);
        assert!(snap.message.is_empty());
        assert!(snap.results.is_empty());

        local.clear_selection();
        assert_eq!(local.selected_count(), 0);
        assert_eq!(local.destination(), LocalDestination::RemoteDrive);
    }
}
