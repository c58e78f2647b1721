use crate::app::App;
use crate::error::AppError;
use crate::models::drive_types::{ConnectionStatus, RemoteDestination};
use crate::services::summary::describe_connection;
use serde_json::json;
use std::process::ExitCode;

pub async fn show_status(
    app: &App,
    destination: RemoteDestination,
    json: bool,
) -> Result<ExitCode, AppError> {
    app.remote.set_destination(destination);
    let status = app.connection.check_status().await;
    print_status(status, destination, json)?;
    Ok(ExitCode::SUCCESS)
}

pub(crate) fn print_status(
    status: ConnectionStatus,
    destination: RemoteDestination,
    json: bool,
) -> Result<(), AppError> {
    if json {
        let value = json!({
            "source_connected": status.source_connected,
            "destination_connected": status.destination_connected,
            "destination": destination,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let (source, dest) = describe_connection(status, destination);
    println!("Source account:      {}", source);
    println!("Destination account: {}", dest);
    Ok(())
}
