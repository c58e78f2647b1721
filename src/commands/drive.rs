use crate::app::App;
use crate::error::AppError;
use crate::models::drive_types::RemoteDestination;
use crate::models::pipeline_types::PipelineSnapshot;
use serde_json::json;
use std::process::ExitCode;

const MSG_CONNECT_SOURCE: &str =
    "Source account is not connected. Run `pixclad-uploader connect source` first.";

/// Re-read the connection and fetch the listing when fetching is enabled.
/// `None` means the fetch affordance is disabled and nothing was requested.
async fn refresh_listing(app: &App) -> Result<Option<PipelineSnapshot>, AppError> {
    app.connection.check_status().await;
    if !app.remote.can_fetch() {
        log::info!("Folder listing disabled in stage {:?}", app.remote.stage());
        return Ok(None);
    }
    app.remote.fetch_folders().await.map(Some)
}

pub async fn list_folders(app: &App, json: bool) -> Result<ExitCode, AppError> {
    let snapshot = refresh_listing(app).await?;
    let folders = app.remote.folders();
    let message = match &snapshot {
        Some(snapshot) => snapshot.message.as_str(),
        None => MSG_CONNECT_SOURCE,
    };

    if json {
        let value = json!({
            "stage": app.remote.stage(),
            "message": message,
            "folders": folders,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", message);
        for folder in &folders {
            println!("  {}  {}", folder.id, folder.name);
        }
    }

    Ok(match snapshot {
        Some(snapshot) if !snapshot.failed() => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

pub async fn process_folder(
    app: &App,
    folder_id: &str,
    folder_name: Option<&str>,
    destination: RemoteDestination,
    json: bool,
) -> Result<ExitCode, AppError> {
    app.remote.set_destination(destination);
    let name = folder_name.unwrap_or(folder_id);
    let snapshot = app.remote.process_folder(folder_id, name).await?;
    super::report_snapshot(&snapshot, json)
}
