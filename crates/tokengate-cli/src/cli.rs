//! CLI argument parsing

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main CLI application structure
#[derive(Parser, Debug)]
#[command(
    name = "tokengate",
    version,
    about = "PKCE tooling for OAuth 2.0 token endpoints",
    long_about = "Tokengate derives S256 code challenges and replays the token endpoint's\n\
                  code_verifier check against grants and clients loaded from a config file.\n\n\
                  SECURITY WARNINGS:\n\
                  - Verifiers and tokens passed as arguments may end up in shell history\n\
                  - Config files holding live grants should not be committed"
)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (TOML, YAML or JSON)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the S256 code challenge for a verifier
    Challenge {
        /// Code verifier
        verifier: String,
    },

    /// Run the token endpoint PKCE check against configured grants
    Verify(VerifyArgs),
}

/// Token request to check
#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Public client identifier of the requesting client
    #[arg(long)]
    pub client_id: String,

    /// Token request grant_type
    #[arg(long)]
    pub grant_type: String,

    /// Authorization code (authorization_code exchanges)
    #[arg(long)]
    pub code: Option<String>,

    /// Refresh token (refresh_token exchanges)
    #[arg(long)]
    pub refresh_token: Option<String>,

    /// PKCE code verifier
    #[arg(long)]
    pub code_verifier: Option<String>,

    /// Enforcement mode
    #[arg(long, value_enum, default_value = "auto")]
    pub mode: VerifyMode,
}

/// How strictly the check is enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerifyMode {
    /// PKCE must verify
    Required,
    /// PKCE is checked only when it applies
    IfAvailable,
    /// Required for public clients, if-available for everyone else
    Auto,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable
    Human,
    /// JSON output
    Json,
}
