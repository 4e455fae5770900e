//! Command-line arguments
//!
//! Every flag can also be set through its environment variable; unset flags
//! fall through to the TOML file and then to compiled defaults.

use clap::Parser;
use grievance_common::config::{default_config_path, load_toml_config, Overrides, ServiceSettings};
use std::path::PathBuf;

/// Command-line arguments for grievance-intake
#[derive(Parser, Debug, Clone)]
#[command(name = "grievance-intake")]
#[command(about = "Hostel grievance intake and triage service")]
#[command(version)]
pub struct Args {
    /// Path to config.toml
    #[arg(short, long, env = "GRIEVANCE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Host/interface to bind
    #[arg(long, env = "GRIEVANCE_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "GRIEVANCE_PORT")]
    pub port: Option<u16>,

    /// SQLite database file
    #[arg(short, long, env = "GRIEVANCE_DATABASE")]
    pub database: Option<PathBuf>,

    /// Base URL of the analysis service
    #[arg(long, env = "GRIEVANCE_ANALYSIS_URL")]
    pub analysis_url: Option<String>,

    /// Timeout for each analysis request, in seconds
    #[arg(long, env = "GRIEVANCE_ANALYSIS_TIMEOUT_SECS")]
    pub analysis_timeout_secs: Option<u64>,

    /// Origin tag recorded with each submission
    #[arg(long, env = "GRIEVANCE_ORIGIN_TAG")]
    pub origin_tag: Option<String>,
}

impl Args {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(default_config_path)
    }

    /// Read the config file and resolve the effective settings
    ///
    /// Logs which file was used, so call it after the subscriber is set up.
    pub fn load_settings(&self) -> grievance_common::Result<ServiceSettings> {
        let toml_config = load_toml_config(&self.config_path())?;
        ServiceSettings::resolve(&self.overrides(), &toml_config)
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            database_path: self.database.clone(),
            analysis_base_url: self.analysis_url.clone(),
            analysis_timeout_secs: self.analysis_timeout_secs,
            origin_tag: self.origin_tag.clone(),
        }
    }
}
