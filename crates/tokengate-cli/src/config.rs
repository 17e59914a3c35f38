//! Configuration loading
//!
//! A config file (TOML, YAML or JSON, picked by extension) is layered under
//! environment variables prefixed with `TOKENGATE_`. Nested keys use `__`,
//! e.g. `TOKENGATE_LOGGING__LEVEL=debug`.

use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tokengate_pkce::{GrantRecord, InMemoryGrantStore, RegisteredClient};

use crate::error::{CliError, CliResult};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "TOKENGATE";

/// Top-level CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokengateConfig {
    /// Logging settings
    pub logging: LoggingConfig,
    /// Registered clients
    pub clients: Vec<RegisteredClient>,
    /// Issued grants
    pub grants: Vec<GrantRecord>,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON log lines
    pub structured: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            structured: false,
        }
    }
}

impl TokengateConfig {
    /// Load configuration from an optional file plus `TOKENGATE_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file doesn't exist
    /// - The file format is unsupported
    /// - The file contains invalid configuration
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        Self::load_with_environment(path, environment(ENV_PREFIX))
    }

    /// Load configuration with an explicit environment source
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_environment(path: Option<&Path>, env: Environment) -> CliResult<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(CliError::ConfigNotFound(path.to_path_buf()));
            }

            let format = match path.extension().and_then(|s| s.to_str()) {
                Some("toml") => FileFormat::Toml,
                Some("yaml") | Some("yml") => FileFormat::Yaml,
                Some("json") => FileFormat::Json,
                _ => return Err(CliError::UnsupportedFormat(path.to_path_buf())),
            };
            let name = path
                .to_str()
                .ok_or_else(|| CliError::UnsupportedFormat(path.to_path_buf()))?;

            builder = builder.add_source(File::new(name, format));
        }

        // Environment variables override file settings
        let config = builder.add_source(env).build()?;

        Ok(config.try_deserialize()?)
    }

    /// Find a registered client by its public `client_id`
    pub fn find_client(&self, client_id: &str) -> Option<&RegisteredClient> {
        self.clients.iter().find(|c| c.client_id == client_id)
    }

    /// Build an in-memory grant store holding every configured grant
    pub fn grant_store(&self) -> InMemoryGrantStore {
        self.grants.iter().cloned().collect()
    }
}

/// `TOKENGATE_LOGGING__LEVEL` style environment source
pub fn environment(prefix: &str) -> Environment {
    Environment::with_prefix(prefix)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
