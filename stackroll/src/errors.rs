//! Error types for stackroll

use thiserror::Error;

/// Main error type for stackroll
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Resolution error: {0}")]
    ResolveError(String),

    #[error("Manifest error: {0}")]
    ManifestError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Target not found: {0}")]
    TargetNotFound(String),

    #[error("Submission rejected: {0}")]
    SubmissionRejected(String),

    #[error("Rollback failed: {0}")]
    RollbackFailed(String),
}
