use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use seedcheck_seed::SeedOptions;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_SETTINGS_FILE: &str = "seedcheck.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Connection used to create and drop per-run databases.
    pub admin_url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub ready_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        let seed = SeedOptions::default();
        Self {
            admin_url: None,
            max_connections: seed.max_connections,
            acquire_timeout_secs: seed.acquire_timeout.as_secs(),
            ready_timeout_secs: seed.ready_timeout.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: LogFormat,
    /// Fallback filter when `RUST_LOG` is unset.
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    pub fn seed_options(&self) -> SeedOptions {
        SeedOptions {
            max_connections: self.database.max_connections,
            acquire_timeout: Duration::from_secs(self.database.acquire_timeout_secs),
            ready_timeout: Duration::from_secs(self.database.ready_timeout_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}

/// Load settings from `path`, or from `seedcheck.toml` if present, or defaults.
///
/// An admin URL missing from the file is taken from
/// `SEEDCHECK_ADMIN_DATABASE_URL`, then `DATABASE_URL`.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, SettingsError> {
    let mut settings = match path {
        Some(path) => read_settings(path)?,
        None => {
            let default_path = Path::new(DEFAULT_SETTINGS_FILE);
            if default_path.exists() {
                read_settings(default_path)?
            } else {
                Settings::default()
            }
        }
    };

    if settings.database.admin_url.is_none() {
        settings.database.admin_url = env::var("SEEDCHECK_ADMIN_DATABASE_URL")
            .or_else(|_| env::var("DATABASE_URL"))
            .ok();
    }

    Ok(settings)
}

fn read_settings(path: &Path) -> Result<Settings, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_settings(&content).map_err(|source| SettingsError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_settings(content: &str) -> Result<Settings, toml::de::Error> {
    toml::from_str(content)
}
