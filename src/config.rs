use crate::error::AppError;
use crate::models::drive_types::RedirectTarget;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5001";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub api_base_url: String,
    /// Raw `Cookie` header value for the service session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            session_cookie: None,
            download_dir: None,
        }
    }
}

/// Overrides taken from the command line; applied last.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_base_url: Option<String>,
    pub session_cookie: Option<String>,
    pub download_dir: Option<PathBuf>,
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pixclad")
        .join("config.json")
}

impl Config {
    pub fn load_from(path: &PathBuf) -> Result<Option<Self>, AppError> {
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("read config {}: {e}", path.display())))?;
        let cfg: Config = serde_json::from_str(&data)
            .map_err(|e| AppError::config(format!("parse config {}: {e}", path.display())))?;
        Ok(Some(cfg))
    }

    pub fn save_to(&self, path: &PathBuf) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::config(format!("create config dir: {e}")))?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data).map_err(|e| AppError::config(format!("write config: {e}")))
    }

    pub fn save(&self) -> Result<(), AppError> {
        self.save_to(&config_path())
    }

    /// Apply `PIXCLAD_*` environment variables on top of `self`.
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var("PIXCLAD_API_BASE_URL") {
            if !url.trim().is_empty() {
                self.api_base_url = url;
            }
        }
        if let Ok(cookie) = std::env::var("PIXCLAD_SESSION_COOKIE") {
            if !cookie.trim().is_empty() {
                self.session_cookie = Some(cookie);
            }
        }
        if let Ok(dir) = std::env::var("PIXCLAD_DOWNLOAD_DIR") {
            if !dir.trim().is_empty() {
                self.download_dir = Some(PathBuf::from(dir));
            }
        }
        self
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(url) = overrides.api_base_url {
            self.api_base_url = url;
        }
        if let Some(cookie) = overrides.session_cookie {
            self.session_cookie = Some(cookie);
        }
        if let Some(dir) = overrides.download_dir {
            self.download_dir = Some(dir);
        }
        self
    }

    /// Resolution order: defaults → config file → env vars → command line.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self, AppError> {
        let path = config_path();
        let base = match Self::load_from(&path)? {
            Some(cfg) => {
                log::info!("Config loaded from {}", path.display());
                cfg
            }
            None => {
                log::debug!("No config file at {}, using defaults", path.display());
                Config::default()
            }
        };
        Ok(base.with_env().with_overrides(overrides))
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), path)
    }

    pub fn redirect_url(&self, target: RedirectTarget) -> String {
        self.endpoint(target.path())
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
