//! Error types for CLI operations

use thiserror::Error;
use tokengate_pkce::PkceError;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// PKCE check failed
    #[error("PKCE check failed: {0}")]
    Pkce(#[from] PkceError),

    /// Invalid command arguments
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Requested client is not configured
    #[error("Unknown client: {0}")]
    UnknownClient(String),

    /// Configuration file missing
    #[error("Config file not found: {}", .0.display())]
    ConfigNotFound(std::path::PathBuf),

    /// Configuration file extension not recognised
    #[error("Unsupported config format: {} (expected .toml, .yaml, .yml or .json)", .0.display())]
    UnsupportedFormat(std::path::PathBuf),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Get user-friendly suggestions for resolving the error
    pub fn suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::UnknownClient(_) => vec![
                "Check the client_id against the [[clients]] entries in the config file",
                "Pass the config file with --config",
            ],
            Self::ConfigNotFound(_) | Self::UnsupportedFormat(_) => {
                vec!["Use a .toml, .yaml or .json config file"]
            }
            Self::InvalidArguments(_) => vec!["Use --help to see expected arguments"],
            _ => vec![],
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
