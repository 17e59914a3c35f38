//! Logging initialization
//!
//! Logs always go to stderr; stdout carries command output only.
//! `RUST_LOG` takes precedence over the configured level.

use std::io;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

impl LoggingConfig {
    /// Filter directive after applying `-v` flags
    pub fn effective_level(&self, verbose: u8) -> &str {
        match verbose {
            0 => &self.level,
            1 => "debug",
            _ => "trace",
        }
    }

    /// Initialize stderr logging
    ///
    /// # Errors
    ///
    /// Returns an error if the tracing subscriber cannot be initialized (already set).
    pub fn init(&self, verbose: u8) -> io::Result<()> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.effective_level(verbose)));
        let subscriber = tracing_subscriber::registry().with(filter);

        if self.structured {
            subscriber
                .with(fmt::layer().json().with_writer(io::stderr))
                .try_init()
                .map_err(|e| io::Error::other(e.to_string()))
        } else {
            subscriber
                .with(fmt::layer().with_writer(io::stderr))
                .try_init()
                .map_err(|e| io::Error::other(e.to_string()))
        }
    }
}
