//! Configuration loading and settings resolution
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument / environment variable (both arrive as [`Overrides`])
//! 2. TOML config file
//! 3. Compiled default

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Name of the per-user config/data subdirectory
pub const APP_DIR_NAME: &str = "grievance-intake";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_ANALYSIS_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 8;
pub const DEFAULT_ORIGIN_TAG: &str = "web-form";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub analysis_base_url: Option<String>,
    pub analysis_timeout_secs: Option<u64>,
    pub origin_tag: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub analysis_base_url: Option<String>,
    pub analysis_timeout_secs: Option<u64>,
    pub origin_tag: Option<String>,
}

/// Fully resolved settings for the intake service
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    /// Analysis service base URL, without trailing slash
    pub analysis_base_url: String,
    pub analysis_timeout: Duration,
    pub origin_tag: String,
    pub log_level: String,
}

impl ServiceSettings {
    /// Merge overrides, TOML values and compiled defaults
    pub fn resolve(overrides: &Overrides, toml: &TomlConfig) -> Result<Self> {
        let host = first_non_blank([overrides.host.as_deref(), toml.host.as_deref()])
            .unwrap_or(DEFAULT_HOST)
            .to_string();

        let port = overrides.port.or(toml.port).unwrap_or(DEFAULT_PORT);

        let database_path = overrides
            .database_path
            .clone()
            .or_else(|| toml.database_path.clone())
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(default_database_path);

        let analysis_base_url = first_non_blank([
            overrides.analysis_base_url.as_deref(),
            toml.analysis_base_url.as_deref(),
        ])
        .unwrap_or(DEFAULT_ANALYSIS_BASE_URL);
        let analysis_base_url = normalize_base_url(analysis_base_url)?;

        let timeout_secs = overrides
            .analysis_timeout_secs
            .or(toml.analysis_timeout_secs)
            .unwrap_or(DEFAULT_ANALYSIS_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::Config(
                "analysis_timeout_secs must be greater than zero".to_string(),
            ));
        }

        let origin_tag = first_non_blank([
            overrides.origin_tag.as_deref(),
            toml.origin_tag.as_deref(),
        ])
        .unwrap_or(DEFAULT_ORIGIN_TAG)
        .to_string();

        Ok(Self {
            host,
            port,
            database_path,
            analysis_base_url,
            analysis_timeout: Duration::from_secs(timeout_secs),
            origin_tag,
            log_level: toml.logging.level.clone(),
        })
    }
}

fn first_non_blank<'a, const N: usize>(candidates: [Option<&'a str>; N]) -> Option<&'a str> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
}

/// Strip trailing slashes and require an http(s) scheme
pub fn normalize_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(Error::Config(format!(
            "analysis base URL must start with http:// or https://: {}",
            url
        )));
    }
    Ok(trimmed.to_string())
}

/// Default location of `config.toml` for the current platform
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join("config.toml")
}

/// Default location of the SQLite database for the current platform
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("./grievance_data"))
        .join(APP_DIR_NAME)
        .join("grievances.db")
}

/// Load the TOML config file
///
/// A missing file is not an error: logs a warning and returns defaults.
/// A file that exists but cannot be parsed is a configuration error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file not found at {}; using defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content).map_err(|e| {
        Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e))
    })?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}
