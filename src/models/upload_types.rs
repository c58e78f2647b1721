use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A file picked for upload: the name the server will see plus its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedFileSet {
    files: Vec<SelectedFile>,
}

impl SelectedFileSet {
    pub fn new(files: Vec<SelectedFile>) -> Self {
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.content.len() as u64).sum()
    }
}

impl FromIterator<SelectedFile> for SelectedFileSet {
    fn from_iter<I: IntoIterator<Item = SelectedFile>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

/// Where the local pipeline's output goes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocalDestination {
    /// Server answers with a binary archive to save on this machine.
    #[default]
    #[serde(rename = "local")]
    Download,
    /// Server files outputs into the connected drive and answers with JSON.
    #[serde(rename = "gdrive")]
    RemoteDrive,
}

impl LocalDestination {
    pub fn as_wire(&self) -> &'static str {
        match self {
            LocalDestination::Download => "local",
            LocalDestination::RemoteDrive => "gdrive",
        }
    }
}

impl fmt::Display for LocalDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for LocalDestination {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" | "download" => Ok(LocalDestination::Download),
            "gdrive" | "drive" => Ok(LocalDestination::RemoteDrive),
            other => Err(format!("unknown local destination: {}", other)),
        }
    }
}
