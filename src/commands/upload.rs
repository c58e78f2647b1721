use crate::app::App;
use crate::error::AppError;
use crate::models::upload_types::LocalDestination;
use crate::services::fs_service;
use std::path::PathBuf;
use std::process::ExitCode;

pub async fn upload(
    app: &App,
    paths: Vec<PathBuf>,
    destination: LocalDestination,
    json: bool,
) -> Result<ExitCode, AppError> {
    let selection = fs_service::load_selection(paths).await?;
    log::info!(
        "Selected {} file(s), {} bytes",
        selection.len(),
        selection.total_bytes()
    );

    app.local.select_files(selection);
    app.local.set_destination(destination);
    let snapshot = app.local.submit().await?;
    super::report_snapshot(&snapshot, json)
}
