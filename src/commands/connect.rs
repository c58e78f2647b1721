use crate::app::App;
use crate::cli::Account;
use crate::commands::status::print_status;
use crate::error::AppError;
use crate::models::drive_types::{RedirectTarget, RemoteDestination};
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn connect(app: &App, account: Account, json: bool) -> Result<ExitCode, AppError> {
    let (target, shown_for) = match account {
        Account::Source => (RedirectTarget::SourceLogin, RemoteDestination::SameDrive),
        Account::Destination => (
            RedirectTarget::DestinationLogin,
            RemoteDestination::DifferentDrive,
        ),
    };
    redirect_and_recheck(app, target, shown_for, json).await
}

pub async fn disconnect_destination(app: &App, json: bool) -> Result<ExitCode, AppError> {
    redirect_and_recheck(
        app,
        RedirectTarget::DestinationLogout,
        RemoteDestination::DifferentDrive,
        json,
    )
    .await
}

/// The OAuth flow finishes in the browser; the status is re-read once the
/// user comes back.
async fn redirect_and_recheck(
    app: &App,
    target: RedirectTarget,
    shown_for: RemoteDestination,
    json: bool,
) -> Result<ExitCode, AppError> {
    let url = app.config.redirect_url(target);
    log::info!("Opening {}", url);
    if let Err(e) = open::that(&url) {
        log::warn!("Could not open a browser: {}", e);
        println!("Open this address in your browser: {}", url);
    }

    println!("Press Enter once you are done in the browser.");
    wait_for_enter().await?;

    let status = app.connection.check_status().await;
    print_status(status, shown_for, json)?;
    Ok(ExitCode::SUCCESS)
}

async fn wait_for_enter() -> Result<(), AppError> {
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(())
}
