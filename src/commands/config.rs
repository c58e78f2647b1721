use crate::cli::ConfigAction;
use crate::config::{config_path, Config};
use crate::error::AppError;
use std::process::ExitCode;

pub fn run(action: ConfigAction, config: &Config) -> Result<ExitCode, AppError> {
    match action {
        ConfigAction::Init => {
            config.save()?;
            println!("Wrote {}", config_path().display());
        }
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
    }
    Ok(ExitCode::SUCCESS)
}
