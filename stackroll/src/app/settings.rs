//! Settings file management

use std::path::Path;

use secrecy::SecretString;
use serde::Deserialize;

use crate::deploy::gate::MissingHealthCheck;
use crate::errors::DeployError;
use crate::logs::LogLevel;

/// Settings read from an optional JSON file
///
/// Every field may be overridden on the command line.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: Option<LogLevel>,

    /// Emit JSON logs
    #[serde(default)]
    pub json_logs: bool,

    /// Control plane connection
    #[serde(default)]
    pub portainer: PortainerSettings,

    /// Health gate tuning
    #[serde(default)]
    pub health: HealthSettings,

    /// Restore the previous manifest on failure
    #[serde(default = "default_true")]
    pub rollback: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: None,
            json_logs: false,
            portainer: PortainerSettings::default(),
            health: HealthSettings::default(),
            rollback: true,
        }
    }
}

/// Control plane settings
#[derive(Debug, Clone, Deserialize)]
pub struct PortainerSettings {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default, deserialize_with = "deserialize_secret")]
    pub password: Option<SecretString>,

    #[serde(default, deserialize_with = "deserialize_secret")]
    pub api_key: Option<SecretString>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Remove services no longer in the manifest
    #[serde(default = "default_true")]
    pub prune: bool,

    /// Pull images on every update
    #[serde(default = "default_true")]
    pub pull_image: bool,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.map(SecretString::from))
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for PortainerSettings {
    fn default() -> Self {
        Self {
            url: None,
            username: None,
            password: None,
            api_key: None,
            request_timeout_secs: default_request_timeout(),
            prune: true,
            pull_image: true,
        }
    }
}

/// Health gate settings
#[derive(Debug, Clone, Deserialize)]
pub struct HealthSettings {
    /// Budget of each gate session in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Delay between sampling rounds in seconds
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    #[serde(default)]
    pub missing_health_check: MissingHealthCheck,

    /// Log lines fetched per unhealthy container
    #[serde(default = "default_log_tail")]
    pub log_tail_lines: u32,
}

fn default_timeout() -> u64 {
    300
}

fn default_interval() -> u64 {
    5
}

fn default_log_tail() -> u32 {
    50
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            interval_secs: default_interval(),
            missing_health_check: MissingHealthCheck::default(),
            log_tail_lines: default_log_tail(),
        }
    }
}

impl Settings {
    /// Read settings from a JSON file
    pub async fn load(path: &Path) -> Result<Self, DeployError> {
        let contents = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&contents)?)
    }
}
