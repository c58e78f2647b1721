use crate::config::ConfigOverrides;
use crate::models::drive_types::RemoteDestination;
use crate::models::upload_types::LocalDestination;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pixclad-uploader")]
#[command(about = "Send photos to the PixClad classification service", long_about = None)]
pub struct Cli {
    /// Processing service base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Session cookie sent with every request, e.g. "session=..."
    #[arg(long, global = true)]
    pub cookie: Option<String>,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show which drive accounts are connected
    Status {
        /// Remote destination the destination line is shown for
        #[arg(long, default_value = "gdrive-source")]
        destination: RemoteDestination,
    },
    /// Connect a drive account in the browser
    Connect {
        #[arg(value_enum)]
        account: Account,
    },
    /// Disconnect the destination drive account in the browser
    DisconnectDestination,
    /// List the top-level folders of the source drive
    Folders,
    /// Classify one folder of the source drive
    ProcessFolder {
        /// Folder identifier as listed by `folders`
        id: String,
        /// Display name; defaults to the identifier
        #[arg(long)]
        name: Option<String>,
        /// gdrive-source, gdrive-destination or local
        #[arg(long, default_value = "gdrive-source")]
        destination: RemoteDestination,
    },
    /// Upload local files or folders for classification
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// local (download an archive) or gdrive
        #[arg(long, default_value = "local")]
        destination: LocalDestination,
        /// Where downloaded archives are saved
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write the resolved configuration to the config file
    Init,
    /// Print the resolved configuration
    Show,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Account {
    Source,
    Destination,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        let download_dir = match &self.command {
            Commands::Upload { out_dir, .. } => out_dir.clone(),
            _ => None,
        };
        ConfigOverrides {
            api_base_url: self.base_url.clone(),
            session_cookie: self.cookie.clone(),
            download_dir,
        }
    }
}
