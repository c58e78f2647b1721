use crate::models::result_types::OperationResult;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationPhase {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Where the remote pipeline stands, as the user would describe it.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RemoteStage {
    Disconnected,
    Connected,
    FetchingFolders,
    FoldersLoaded,
    Processing,
    Succeeded,
    Failed,
}

/// Point-in-time view of one pipeline, handed to the presentation layer.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct PipelineSnapshot {
    pub phase: OperationPhase,
    pub loading: bool,
    pub message: String,
    pub results: OperationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_to: Option<PathBuf>,
}

impl PipelineSnapshot {
    pub fn failed(&self) -> bool {
        self.phase == OperationPhase::Failed
    }
}
