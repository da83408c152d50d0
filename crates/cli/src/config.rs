//! TOML configuration for the dashboard binary.
//!
//! Every key is optional. Command-line flags and environment variables
//! override the file; see `main.rs`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use resources::FetchPolicy;
use serde::Deserialize;

/// Directory name under the platform config and data dirs.
pub const APP_DIR: &str = "stream-activity";

/// The settings file, after defaults are applied.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server to use with `token`, e.g. `macad.speckle.xyz`.
    #[serde(default)]
    pub server_url: Option<String>,

    #[serde(default)]
    pub token: Option<String>,

    /// Local account store; defaults to `<data dir>/stream-activity/accounts.json`.
    #[serde(default)]
    pub accounts_file: Option<PathBuf>,

    #[serde(default = "default_stream_limit")]
    pub stream_limit: u32,

    #[serde(default = "default_branch_limit")]
    pub branch_limit: u32,

    #[serde(default = "default_commit_limit")]
    pub commit_limit: u32,

    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub fetch_policy: FetchPolicy,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,
}

/// The `[logging]` table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit log lines as JSON objects instead of human-readable text.
    #[serde(default)]
    pub json: bool,

    /// OTLP/gRPC collector endpoint; spans are exported only when set.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

/// The `[tracking]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    #[serde(default = "default_tracking_enabled")]
    pub enabled: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: default_tracking_enabled(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: None,
            token: None,
            accounts_file: None,
            stream_limit: default_stream_limit(),
            branch_limit: default_branch_limit(),
            commit_limit: default_commit_limit(),
            request_timeout_secs: default_timeout(),
            fetch_policy: FetchPolicy::default(),
            logging: LoggingConfig::default(),
            tracking: TrackingConfig::default(),
        }
    }
}

fn default_stream_limit() -> u32 {
    10
}

fn default_branch_limit() -> u32 {
    10
}

fn default_commit_limit() -> u32 {
    100
}

fn default_timeout() -> u64 {
    30
}

fn default_tracking_enabled() -> bool {
    true
}

impl Config {
    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("stream_limit", self.stream_limit),
            ("branch_limit", self.branch_limit),
            ("commit_limit", self.commit_limit),
        ] {
            if value == 0 {
                bail!("`{key}` must be at least 1");
            }
        }
        if self.request_timeout_secs == 0 {
            bail!("`request_timeout_secs` must be at least 1");
        }
        Ok(())
    }
}

/// Default config file location: `<config dir>/stream-activity/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

/// Loads the config file.
///
/// An explicitly given path must exist. A missing file at the default
/// location yields [`Config::default`].
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(Config::default()),
        },
    };

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = parse_config(&contents)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    Ok(config)
}

/// Parses and validates a TOML settings document.
pub fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}
