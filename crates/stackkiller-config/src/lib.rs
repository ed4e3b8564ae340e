pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that points directly at a settings file
pub const CONFIG_PATH_ENV: &str = "STACKKILLER_CONFIG_PATH";

const CANDIDATES: [&str; 2] = ["stackkiller.yaml", ".stackkiller.yaml"];

/// StackKiller settings
///
/// Every field has a default, so an empty file (or no file) is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub wait: WaitSettings,
    pub retry: RetrySettings,
    pub listing: ListingSettings,
    pub local: LocalSettings,

    /// AWS region override (otherwise resolved from the environment)
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaitSettings {
    /// Total time to wait for a delete to finish
    pub max_wait_seconds: u64,

    /// Delay between status checks
    pub poll_interval_seconds: u64,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            max_wait_seconds: 3600,
            poll_interval_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySettings {
    /// Delete requests per forced deletion, first attempt included
    pub max_delete_attempts: u32,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_delete_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListingSettings {
    /// Upper bound on resource listing pages
    pub max_pages: u32,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self { max_pages: 100 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocalSettings {
    /// Endpoint used with `--local`
    pub endpoint_url: String,
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            endpoint_url: "http://localhost:4566".to_string(),
        }
    }
}

impl Settings {
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        // A file holding only comments parses as null
        let settings: Option<Self> = serde_yaml::from_str(content)?;
        Ok(settings.unwrap_or_default())
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.wait.max_wait_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.wait.poll_interval_seconds)
    }

    pub fn validate(&self) -> Result<()> {
        if self.wait.poll_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "wait.poll_interval_seconds must be greater than 0".into(),
            ));
        }
        if self.retry.max_delete_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.max_delete_attempts must be at least 1".into(),
            ));
        }
        if self.listing.max_pages == 0 {
            return Err(ConfigError::Invalid(
                "listing.max_pages must be at least 1".into(),
            ));
        }
        if self.local.endpoint_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "local.endpoint_url must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Locate the settings file
///
/// Search order:
/// 1. `STACKKILLER_CONFIG_PATH` (direct path)
/// 2. Current directory: stackkiller.yaml, .stackkiller.yaml
/// 3. ~/.config/stackkiller/config.yaml
///
/// Returns `None` when no file exists; defaults apply in that case.
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::ConfigFileNotFound(path));
    }

    let current_dir = std::env::current_dir()?;
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("stackkiller").join("config.yaml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// Read and validate a settings file
pub fn load_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Err(ConfigError::ConfigFileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let settings = Settings::from_yaml(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    settings.validate()?;

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Load settings from `explicit`, or from the discovered file, or defaults
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file()?,
    };

    match path {
        Some(path) => load_from(&path),
        None => {
            tracing::debug!("No settings file found, using defaults");
            Ok(Settings::default())
        }
    }
}
