//! PKCE failure types and their OAuth 2.0 wire representation
//!
//! Two failure kinds exist:
//! - [`PkceError::InvalidGrant`] - client error, always names the offending parameter
//! - [`PkceError::ServerError`] - environment defect (hash primitive or grant store unavailable)
//!
//! "Not applicable" is not an error; see [`crate::PkceOutcome`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of every `invalid_grant` description
pub const DESCRIPTION_PREFIX: &str = "Client authentication failed: ";

/// Terminal failure of a PKCE check
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PkceError {
    /// The grant cannot be redeemed (unknown grant, missing challenge, wrong verifier)
    #[error("Client authentication failed: {parameter}")]
    InvalidGrant {
        /// Parameter reported to the client
        parameter: &'static str,
    },

    /// The server cannot perform the check
    #[error("Server error: {reason}")]
    ServerError {
        /// Operator-facing reason, never sent to the client
        reason: String,
    },
}

impl PkceError {
    /// `invalid_grant` for the given parameter
    pub const fn invalid_grant(parameter: &'static str) -> Self {
        Self::InvalidGrant { parameter }
    }

    /// `server_error` with an operator-facing reason
    pub fn server_error(reason: impl Into<String>) -> Self {
        Self::ServerError {
            reason: reason.into(),
        }
    }

    /// OAuth 2.0 error code for this failure
    pub const fn error_code(&self) -> OAuth2ErrorCode {
        match self {
            Self::InvalidGrant { .. } => OAuth2ErrorCode::InvalidGrant,
            Self::ServerError { .. } => OAuth2ErrorCode::ServerError,
        }
    }

    /// Offending parameter, if this is a client error
    pub const fn parameter(&self) -> Option<&'static str> {
        match self {
            Self::InvalidGrant { parameter } => Some(*parameter),
            Self::ServerError { .. } => None,
        }
    }

    /// Whether the client caused this failure
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidGrant { .. })
    }

    /// Body of the token endpoint error response (RFC 6749 Section 5.2)
    pub fn to_error_response(&self) -> OAuth2ErrorResponse {
        match self {
            Self::InvalidGrant { parameter } => OAuth2ErrorResponse {
                error: OAuth2ErrorCode::InvalidGrant,
                error_description: Some(format!("{DESCRIPTION_PREFIX}{parameter}")),
                error_uri: None,
            },
            Self::ServerError { .. } => OAuth2ErrorResponse {
                error: OAuth2ErrorCode::ServerError,
                error_description: None,
                error_uri: None,
            },
        }
    }
}

/// OAuth 2.0 error codes produced by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuth2ErrorCode {
    /// `invalid_grant`
    InvalidGrant,
    /// `server_error`
    ServerError,
}

impl OAuth2ErrorCode {
    /// Wire value
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidGrant => "invalid_grant",
            Self::ServerError => "server_error",
        }
    }
}

impl fmt::Display for OAuth2ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token endpoint error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2ErrorResponse {
    /// Error code
    pub error: OAuth2ErrorCode,
    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
    /// Documentation URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_uri: Option<String>,
}

impl From<&PkceError> for OAuth2ErrorResponse {
    fn from(error: &PkceError) -> Self {
        error.to_error_response()
    }
}
