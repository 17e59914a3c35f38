//! Token endpoint parameter names, grant types and token kinds
//!
//! The parameter names are part of the wire contract and never change.

use std::fmt;

use serde::{Deserialize, Serialize};

/// `grant_type` request parameter
pub const GRANT_TYPE: &str = "grant_type";
/// `code` request parameter (authorization code)
pub const CODE: &str = "code";
/// `refresh_token` request parameter
pub const REFRESH_TOKEN: &str = "refresh_token";
/// `code_verifier` request parameter (RFC 7636 Section 4.5)
pub const CODE_VERIFIER: &str = "code_verifier";
/// `code_challenge` authorization request parameter (RFC 7636 Section 4.3)
pub const CODE_CHALLENGE: &str = "code_challenge";
/// `code_challenge_method` authorization request parameter
pub const CODE_CHALLENGE_METHOD: &str = "code_challenge_method";

/// OAuth 2.0 grant type presented at the token endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GrantType {
    /// `authorization_code`
    AuthorizationCode,
    /// `refresh_token`
    RefreshToken,
    /// Any other grant type (client_credentials, device_code, ...)
    Other(String),
}

impl GrantType {
    /// Parse a `grant_type` value. Matching is exact and case-sensitive.
    pub fn parse(value: &str) -> Self {
        match value {
            "authorization_code" => Self::AuthorizationCode,
            "refresh_token" => Self::RefreshToken,
            other => Self::Other(other.to_string()),
        }
    }

    /// Wire value of this grant type
    pub fn as_str(&self) -> &str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
            Self::Other(value) => value,
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for GrantType {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// Kind tag used to index grants by token value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// Authorization code (`code`)
    #[serde(rename = "code")]
    AuthorizationCode,
    /// Refresh token (`refresh_token`)
    #[serde(rename = "refresh_token")]
    RefreshToken,
}

impl TokenKind {
    /// Wire value of this token kind
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthorizationCode => CODE,
            Self::RefreshToken => REFRESH_TOKEN,
        }
    }

    /// Grant type that redeems this token kind
    pub const fn grant_type(self) -> GrantType {
        match self {
            Self::AuthorizationCode => GrantType::AuthorizationCode,
            Self::RefreshToken => GrantType::RefreshToken,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
