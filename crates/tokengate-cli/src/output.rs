//! Output formatting for CLI results

use std::fmt::Display;

use serde::Serialize;
use tokengate_pkce::PkceError;

use crate::cli::OutputFormat;
use crate::error::CliResult;

/// Print a command result in the requested format
///
/// # Errors
///
/// Returns an error if the value cannot be serialized to JSON.
pub fn display<T: Serialize + Display>(format: OutputFormat, value: &T) -> CliResult<()> {
    match format {
        OutputFormat::Human => println!("{value}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

/// Print the OAuth 2.0 error body a token endpoint would return
///
/// # Errors
///
/// Returns an error if the response cannot be serialized to JSON.
pub fn display_error(error: &PkceError) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(&error.to_error_response())?);
    Ok(())
}
