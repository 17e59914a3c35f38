//! Typed token request parameters
//!
//! A [`ClientAuthenticationAttempt`] is built per token request from the raw
//! request parameters. Absent and empty values stay distinct: `code=` yields
//! `Some("")`, a missing `code` yields `None`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::params::{self, GrantType, TokenKind};

/// Inbound token exchange request, as seen by the PKCE check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAuthenticationAttempt {
    /// `grant_type`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_type: Option<String>,
    /// `code` (authorization code)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// `refresh_token`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// `code_verifier`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_verifier: Option<String>,
    /// Any other request parameter
    #[serde(flatten)]
    pub additional_parameters: HashMap<String, String>,
}

impl ClientAuthenticationAttempt {
    /// Create an empty attempt
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an attempt from `(name, value)` pairs
    ///
    /// A parameter that appears more than once keeps its last value.
    pub fn from_parameters<I, K, V>(parameters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut attempt = Self::default();
        for (name, value) in parameters {
            attempt.set_parameter(name.as_ref(), value.into());
        }
        attempt
    }

    /// Build an attempt from an `application/x-www-form-urlencoded` body
    ///
    /// ```rust
    /// use tokengate_pkce::ClientAuthenticationAttempt;
    ///
    /// let attempt = ClientAuthenticationAttempt::from_form_urlencoded(
    ///     "grant_type=refresh_token&refresh_token=rt%2B1&code_verifier=abc",
    /// );
    /// assert_eq!(attempt.refresh_token.as_deref(), Some("rt+1"));
    /// ```
    pub fn from_form_urlencoded(body: &str) -> Self {
        Self::from_parameters(
            url::form_urlencoded::parse(body.as_bytes())
                .map(|(name, value)| (name.into_owned(), value.into_owned())),
        )
    }

    /// Set a single parameter by wire name
    pub fn set_parameter(&mut self, name: &str, value: String) {
        match name {
            params::GRANT_TYPE => self.grant_type = Some(value),
            params::CODE => self.code = Some(value),
            params::REFRESH_TOKEN => self.refresh_token = Some(value),
            params::CODE_VERIFIER => self.code_verifier = Some(value),
            other => {
                self.additional_parameters.insert(other.to_string(), value);
            }
        }
    }

    /// Builder: set `grant_type`
    pub fn with_grant_type(mut self, grant_type: impl Into<String>) -> Self {
        self.grant_type = Some(grant_type.into());
        self
    }

    /// Builder: set `code`
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Builder: set `refresh_token`
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Builder: set `code_verifier`
    pub fn with_code_verifier(mut self, code_verifier: impl Into<String>) -> Self {
        self.code_verifier = Some(code_verifier.into());
        self
    }

    /// Parsed grant type, if one was presented
    pub fn grant_type(&self) -> Option<GrantType> {
        self.grant_type.as_deref().map(GrantType::parse)
    }

    /// Token this attempt wants to redeem, with the kind used to look it up
    ///
    /// Returns `None` unless the grant type is `authorization_code` with a
    /// `code`, or `refresh_token` with a `refresh_token`. Empty values count
    /// as present.
    pub fn presented_token(&self) -> Option<(&str, TokenKind)> {
        match self.grant_type()? {
            GrantType::AuthorizationCode => self
                .code
                .as_deref()
                .map(|code| (code, TokenKind::AuthorizationCode)),
            GrantType::RefreshToken => self
                .refresh_token
                .as_deref()
                .map(|token| (token, TokenKind::RefreshToken)),
            GrantType::Other(_) => None,
        }
    }
}
