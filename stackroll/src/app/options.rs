//! Command line and resolved application options

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use secrecy::SecretString;

use crate::app::settings::Settings;
use crate::authn::session::Credentials;
use crate::deploy::executor::ExecutorOptions;
use crate::deploy::gate::{GateSettings, MissingHealthCheck};
use crate::deploy::manifest::ImageChange;
use crate::deploy::portainer::SubmitOptions;
use crate::deploy::target::TargetSpec;
use crate::errors::DeployError;
use crate::logs::{LogLevel, LogOptions};

/// Roll a Portainer stack to a new image with health gating and rollback
#[derive(Debug, Clone, Parser)]
#[command(name = "stackroll", disable_version_flag = true)]
pub struct Cli {
    /// Portainer base URL
    #[arg(long, env = "STACKROLL_URL")]
    pub url: Option<String>,

    /// Portainer username
    #[arg(long, env = "STACKROLL_USERNAME")]
    pub username: Option<String>,

    /// Portainer password
    #[arg(long, env = "STACKROLL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Portainer access token, used instead of username and password
    #[arg(long, env = "STACKROLL_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Environment name or id
    #[arg(long, env = "STACKROLL_ENVIRONMENT")]
    pub environment: Option<String>,

    /// Stack name
    #[arg(long, env = "STACKROLL_STACK")]
    pub stack: Option<String>,

    /// Only update and check this service of the stack
    #[arg(long, env = "STACKROLL_SERVICE")]
    pub service: Option<String>,

    /// New tag for the service images
    #[arg(long, conflicts_with_all = ["image", "compose_file"])]
    pub image_tag: Option<String>,

    /// New image reference for the service images
    #[arg(long, conflicts_with = "compose_file")]
    pub image: Option<String>,

    /// Replacement compose file
    #[arg(long)]
    pub compose_file: Option<PathBuf>,

    /// Health check budget in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Delay between health checks in seconds
    #[arg(long)]
    pub interval: Option<u64>,

    /// Restore the previous manifest on failure, overriding the settings file
    #[arg(long, overrides_with = "no_rollback")]
    pub rollback: bool,

    /// Do not restore the previous manifest on failure
    #[arg(long, overrides_with = "rollback")]
    pub no_rollback: bool,

    /// How to judge containers without a health check
    #[arg(long, value_enum)]
    pub missing_health_check: Option<MissingHealthCheck>,

    /// Log lines shown for each unhealthy container
    #[arg(long)]
    pub log_tail: Option<u32>,

    /// JSON settings file
    #[arg(long, env = "STACKROLL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Emit JSON logs
    #[arg(long)]
    pub json_logs: bool,

    /// Print version information and exit
    #[arg(long)]
    pub version: bool,
}

/// Where the new manifest comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    /// Rewrite the images of the current manifest
    Rewrite(ImageChange),
    /// Submit the content of a compose file
    File(PathBuf),
}

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Portainer base URL
    pub url: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    pub credentials: Credentials,

    pub target: TargetSpec,

    pub manifest_source: ManifestSource,

    pub submit: SubmitOptions,

    pub gate: GateSettings,

    pub executor: ExecutorOptions,

    pub logging: LogOptions,
}

impl AppOptions {
    /// Read the settings file named by `--config`, if any, and merge the
    /// command line over it
    pub async fn load(cli: Cli) -> anyhow::Result<Self> {
        let settings = match &cli.config {
            Some(path) => Settings::load(path)
                .await
                .with_context(|| format!("Unable to read settings file {}", path.display()))?,
            None => Settings::default(),
        };
        Self::from_cli(cli, settings).context("Invalid options")
    }

    /// Merge the command line over the settings file
    pub fn from_cli(cli: Cli, settings: Settings) -> Result<Self, DeployError> {
        let portainer = settings.portainer;
        let health = settings.health;

        let url = cli
            .url
            .or(portainer.url)
            .ok_or_else(|| missing("url"))?;

        let api_key = cli.api_key.map(SecretString::from).or(portainer.api_key);
        let credentials = match api_key {
            Some(key) => Credentials::ApiKey(key),
            None => Credentials::Password {
                username: cli
                    .username
                    .or(portainer.username)
                    .ok_or_else(|| missing("username (or api-key)"))?,
                password: cli
                    .password
                    .map(SecretString::from)
                    .or(portainer.password)
                    .ok_or_else(|| missing("password"))?,
            },
        };

        let target = TargetSpec {
            environment: cli.environment.ok_or_else(|| missing("environment"))?,
            stack: cli.stack.ok_or_else(|| missing("stack"))?,
            service: cli.service,
        };

        let manifest_source = match (cli.compose_file, cli.image, cli.image_tag) {
            (Some(path), _, _) => ManifestSource::File(path),
            (None, Some(image), _) => ManifestSource::Rewrite(ImageChange::Image(image)),
            (None, None, Some(tag)) => ManifestSource::Rewrite(ImageChange::Tag(tag)),
            (None, None, None) => ManifestSource::Rewrite(ImageChange::Tag("latest".to_string())),
        };

        let interval = cli.interval.unwrap_or(health.interval_secs);
        if interval == 0 {
            return Err(DeployError::ConfigError(
                "Health check interval must be at least one second".to_string(),
            ));
        }

        Ok(Self {
            url,
            request_timeout: Duration::from_secs(portainer.request_timeout_secs),
            credentials,
            target,
            manifest_source,
            submit: SubmitOptions {
                prune: portainer.prune,
                pull_image: portainer.pull_image,
            },
            gate: GateSettings {
                poll_interval: Duration::from_secs(interval),
                missing_health_check: cli
                    .missing_health_check
                    .unwrap_or(health.missing_health_check),
                log_tail_lines: cli.log_tail.unwrap_or(health.log_tail_lines),
            },
            executor: ExecutorOptions {
                budget: Duration::from_secs(cli.timeout.unwrap_or(health.timeout_secs)),
                rollback_enabled: match (cli.rollback, cli.no_rollback) {
                    (true, _) => true,
                    (_, true) => false,
                    _ => settings.rollback,
                },
            },
            logging: LogOptions {
                log_level: cli.log_level.or(settings.log_level).unwrap_or_default(),
                json_format: cli.json_logs || settings.json_logs,
            },
        })
    }
}

fn missing(name: &str) -> DeployError {
    DeployError::ConfigError(format!("Missing required option: {}", name))
}
