use crate::error::AppError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Materialises a downloaded archive for the user. Returns where it landed.
#[async_trait]
pub trait ArchiveSaver: Send + Sync {
    async fn save(&self, filename: &str, content_type: &str, bytes: &[u8]) -> Result<PathBuf, AppError>;
}

/// Saves into a directory, never overwriting an existing file.
pub struct DiskSaver {
    dir: PathBuf,
}

impl DiskSaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

/// Keep only the last path component and replace characters that are not
/// safe in a file name.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '<' | '>' | ':' | '"' | '|' | '?' | '*') {
                '_'
            } else {
                c
            }
        })
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "download".to_string()
    } else {
        cleaned
    }
}

/// `out.zip`, then `out (1).zip`, `out (2).zip`, ...
fn unique_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }

    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| filename.to_string());
    let ext = path.extension().map(|e| e.to_string_lossy().to_string());

    let mut n = 1;
    loop {
        let name = match &ext {
            Some(ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", stem, n),
        };
        let candidate = dir.join(name);
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

#[async_trait]
impl ArchiveSaver for DiskSaver {
    async fn save(&self, filename: &str, content_type: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppError::from(format!(
                "Failed to create download directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let name = sanitize_filename(filename);
        let target = unique_path(&self.dir, &name);
        let partial = self.dir.join(format!(".{}.part", name));

        let written = async {
            let mut file = tokio::fs::File::create(&partial).await?;
            file.write_all(bytes).await?;
            file.sync_all().await?;
            Ok::<(), std::io::Error>(())
        }
        .await;

        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(AppError::from(format!(
                "Failed to write {}: {}",
                partial.display(),
                e
            )));
        }

        if let Err(e) = tokio::fs::rename(&partial, &target).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(AppError::from(format!(
                "Failed to move download into {}: {}",
                target.display(),
                e
            )));
        }

        log::info!(
            "Saved {} ({} bytes, {}) to {}",
            name,
            bytes.len(),
            content_type,
            target.display()
        );
        Ok(target)
    }
}
