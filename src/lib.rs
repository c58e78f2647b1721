pub mod app;
pub mod cli;
mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

use app::App;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use error::AppError;
use std::process::ExitCode;

pub fn run() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start the async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(dispatch(cli)) {
        Ok(code) => code,
        Err(e) => {
            log::debug!("Command failed: {:?}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> Result<ExitCode, AppError> {
    let config = Config::resolve(cli.overrides())?;
    let json = cli.json;

    let command = match cli.command {
        Commands::Config { action } => return commands::config::run(action, &config),
        command => command,
    };

    let app = App::new(config)?;
    match command {
        Commands::Status { destination } => {
            commands::status::show_status(&app, destination, json).await
        }
        Commands::Connect { account } => commands::connect::connect(&app, account, json).await,
        Commands::DisconnectDestination => {
            commands::connect::disconnect_destination(&app, json).await
        }
        Commands::Folders => commands::drive::list_folders(&app, json).await,
        Commands::ProcessFolder {
            id,
            name,
            destination,
        } => commands::drive::process_folder(&app, &id, name.as_deref(), destination, json).await,
        Commands::Upload {
            paths, destination, ..
        } => commands::upload::upload(&app, paths, destination, json).await,
        Commands::Config { .. } => Ok(ExitCode::SUCCESS),
    }
}
