//! Registered client policy
//!
//! Client registration storage is external; this module only models the parts
//! the PKCE check reads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-client PKCE policy
pub trait ClientPolicy {
    /// Whether authorization requests from this client must carry a `code_challenge`
    fn require_proof_key(&self) -> bool;
}

/// Client authentication method (RFC 7591 `token_endpoint_auth_method`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthenticationMethod {
    /// Public client, no client authentication
    None,
    /// HTTP Basic with client secret
    ClientSecretBasic,
    /// Client secret in the request body
    ClientSecretPost,
    /// JWT signed with the client secret
    ClientSecretJwt,
    /// JWT signed with the client's private key
    PrivateKeyJwt,
}

impl ClientAuthenticationMethod {
    /// Wire value
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ClientSecretBasic => "client_secret_basic",
            Self::ClientSecretPost => "client_secret_post",
            Self::ClientSecretJwt => "client_secret_jwt",
            Self::PrivateKeyJwt => "private_key_jwt",
        }
    }

    /// Whether this method identifies a public client
    pub const fn is_public(self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for ClientAuthenticationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client settings relevant to PKCE
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Require a `code_challenge` on every authorization request
    #[serde(default)]
    pub require_proof_key: bool,
}

impl ClientSettings {
    /// Settings that require PKCE
    pub fn requiring_proof_key() -> Self {
        Self {
            require_proof_key: true,
        }
    }
}

impl ClientPolicy for ClientSettings {
    fn require_proof_key(&self) -> bool {
        self.require_proof_key
    }
}

/// Registered OAuth 2.0 client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredClient {
    /// Internal identifier
    pub id: String,
    /// OAuth `client_id`
    pub client_id: String,
    /// Allowed client authentication methods
    #[serde(default)]
    pub client_authentication_methods: Vec<ClientAuthenticationMethod>,
    /// Client settings
    #[serde(default)]
    pub client_settings: ClientSettings,
}

impl RegisteredClient {
    /// Create a client with default settings and no authentication methods
    pub fn new(id: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            client_id: client_id.into(),
            client_authentication_methods: Vec::new(),
            client_settings: ClientSettings::default(),
        }
    }

    /// Builder: add an allowed authentication method
    pub fn with_authentication_method(mut self, method: ClientAuthenticationMethod) -> Self {
        if !self.client_authentication_methods.contains(&method) {
            self.client_authentication_methods.push(method);
        }
        self
    }

    /// Builder: replace the client settings
    pub fn with_settings(mut self, settings: ClientSettings) -> Self {
        self.client_settings = settings;
        self
    }

    /// Whether the client may authenticate with `method`
    pub fn supports_authentication_method(&self, method: ClientAuthenticationMethod) -> bool {
        self.client_authentication_methods.contains(&method)
    }
}

impl ClientPolicy for RegisteredClient {
    fn require_proof_key(&self) -> bool {
        self.client_settings.require_proof_key
    }
}
