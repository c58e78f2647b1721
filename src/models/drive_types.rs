use crate::models::result_types::OperationResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionStatus {
    #[serde(default)]
    pub source_connected: bool,
    #[serde(default)]
    pub destination_connected: bool,
}

impl ConnectionStatus {
    pub fn disconnected() -> Self {
        Self::default()
    }
}

/// One entry of the source drive's top-level folder listing.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RemoteFolder {
    pub id: String,
    pub name: String,
    #[serde(rename = "mimeType", default)]
    pub mime_type: Option<String>,
}

/// Where the remote pipeline's output goes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteDestination {
    #[default]
    #[serde(rename = "gdrive-source")]
    SameDrive,
    #[serde(rename = "gdrive-destination")]
    DifferentDrive,
    #[serde(rename = "local")]
    Local,
}

impl RemoteDestination {
    pub fn as_wire(&self) -> &'static str {
        match self {
            RemoteDestination::SameDrive => "gdrive-source",
            RemoteDestination::DifferentDrive => "gdrive-destination",
            RemoteDestination::Local => "local",
        }
    }

    pub fn writes_to_drive(&self) -> bool {
        !matches!(self, RemoteDestination::Local)
    }
}

impl fmt::Display for RemoteDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for RemoteDestination {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gdrive-source" | "same-drive" => Ok(RemoteDestination::SameDrive),
            "gdrive-destination" | "different-drive" => Ok(RemoteDestination::DifferentDrive),
            "local" => Ok(RemoteDestination::Local),
            other => Err(format!("unknown remote destination: {}", other)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProcessFolderRequest {
    pub destination: RemoteDestination,
}

#[derive(Debug, Deserialize, Default)]
pub struct ProcessFolderResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub results: Option<OperationResult>,
}

/// Browser-navigated OAuth endpoints; never awaited by the pipelines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedirectTarget {
    SourceLogin,
    DestinationLogin,
    DestinationLogout,
}

impl RedirectTarget {
    pub fn path(&self) -> &'static str {
        match self {
            RedirectTarget::SourceLogin => "/auth/gdrive/login",
            RedirectTarget::DestinationLogin => "/auth/gdrive/login-destination",
            RedirectTarget::DestinationLogout => "/auth/gdrive/logout-destination",
        }
    }
}
