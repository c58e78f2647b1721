use crate::error::AppError;
use crate::models::upload_types::{SelectedFile, SelectedFileSet};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}

/// Expand the user's picks into a flat, ordered list of files. Files are
/// taken as given; directories are walked recursively, skipping hidden
/// entries, in case-insensitive name order.
pub fn collect_selection(paths: &[PathBuf]) -> Result<Vec<PathBuf>, AppError> {
    let mut files = Vec::new();

    for path in paths {
        if !path.exists() {
            return Err(format!("Path does not exist: {}", path.display()).into());
        }

        if path.is_file() {
            files.push(path.clone());
            continue;
        }

        let walker = WalkDir::new(path)
            .follow_links(true)
            .sort_by(|a, b| {
                a.file_name()
                    .to_string_lossy()
                    .to_lowercase()
                    .cmp(&b.file_name().to_string_lossy().to_lowercase())
            })
            .into_iter()
            .filter_entry(|e| !is_hidden(e));

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::warn!("Skipping unreadable entry under {}: {}", path.display(), e);
                    continue;
                }
            };
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
    }

    Ok(files)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// Read the selection into memory. Each file is named by its base name,
/// which is what the service keys its results by.
pub async fn load_selection(paths: Vec<PathBuf>) -> Result<SelectedFileSet, AppError> {
    let files = tokio::task::spawn_blocking(move || collect_selection(&paths))
        .await
        .map_err(|e| AppError::from(format!("Task join failed: {}", e)))??;

    let mut selected = Vec::with_capacity(files.len());
    for path in files {
        let content = tokio::fs::read(&path)
            .await
            .map_err(|e| AppError::from(format!("Failed to read {}: {}", path.display(), e)))?;
        selected.push(SelectedFile::new(display_name(&path), content));
    }

    log::debug!("Loaded {} file(s) for upload", selected.len());
    Ok(SelectedFileSet::new(selected))
}
