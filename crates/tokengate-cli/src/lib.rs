//! # Tokengate CLI
//!
//! Command-line tools around the `tokengate-pkce` verifier.
//!
//! ## Usage
//!
//! ```bash
//! # Derive the S256 challenge a client should send
//! tokengate challenge dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk
//!
//! # Replay a token request against grants from a config file
//! tokengate --config tokengate.toml verify \
//!   --client-id spa --grant-type authorization_code \
//!   --code abc --code-verifier dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk
//! ```
//!
//! A failed check prints the OAuth 2.0 error body on stdout and exits non-zero.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;

use clap::Parser;

pub use cli::{Cli, Commands, OutputFormat, VerifyArgs, VerifyMode};
pub use config::{LoggingConfig, TokengateConfig};
pub use error::{CliError, CliResult};

/// Run the CLI application
///
/// # Errors
///
/// Returns the first error raised while loading config or running the command.
pub fn run() -> CliResult<()> {
    execute(Cli::parse())
}

/// Execute already-parsed arguments
///
/// # Errors
///
/// Same as [`run`].
pub fn execute(cli: Cli) -> CliResult<()> {
    let config = TokengateConfig::load(cli.config.as_deref())?;
    config.logging.init(cli.verbose)?;

    match cli.command {
        Commands::Challenge { verifier } => {
            let report = commands::challenge(&verifier)?;
            output::display(cli.format, &report)
        }
        Commands::Verify(args) => match commands::verify(&config, &args) {
            Ok(report) => output::display(cli.format, &report),
            Err(CliError::Pkce(error)) => {
                output::display_error(&error)?;
                Err(error.into())
            }
            Err(error) => Err(error),
        },
    }
}
