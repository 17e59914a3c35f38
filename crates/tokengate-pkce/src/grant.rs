//! Grant records and the grant store boundary
//!
//! The authorization server persists a [`GrantRecord`] when it issues an
//! authorization code, and keeps it (indexed by refresh token) once tokens are
//! issued. The PKCE check only reads it through [`GrantStore`].

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::params::TokenKind;

/// PKCE-related parameters of the original authorization request
///
/// `Some("")` and `None` are distinct values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkceParameters {
    /// `code_challenge`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<String>,
    /// `code_challenge_method`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge_method: Option<String>,
    /// Other additional parameters of the authorization request
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Snapshot of the authorization request stored with a grant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRequestSnapshot {
    /// Client that made the authorization request
    pub client_id: String,
    /// Redirect URI of the authorization request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    /// Requested scopes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    /// Additional parameters (`code_challenge`, `code_challenge_method`, ...)
    #[serde(default)]
    pub additional_parameters: PkceParameters,
}

impl AuthorizationRequestSnapshot {
    /// Create a snapshot for the given client with no additional parameters
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Self::default()
        }
    }

    /// Builder: set the PKCE challenge and method
    pub fn with_code_challenge(
        mut self,
        challenge: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        self.additional_parameters.code_challenge = Some(challenge.into());
        self.additional_parameters.code_challenge_method = Some(method.into());
        self
    }

    /// Builder: set the redirect URI
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Builder: set the requested scopes
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Stored `code_challenge`
    pub fn code_challenge(&self) -> Option<&str> {
        self.additional_parameters.code_challenge.as_deref()
    }

    /// Stored `code_challenge_method`
    pub fn code_challenge_method(&self) -> Option<&str> {
        self.additional_parameters.code_challenge_method.as_deref()
    }
}

/// Grant previously issued by the authorization server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRecord {
    /// Store identifier
    pub id: String,
    /// Internal identifier of the registered client
    pub registered_client_id: String,
    /// Resource owner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_name: Option<String>,
    /// Authorization code value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<String>,
    /// Refresh token value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Authorization request this grant was issued for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_request: Option<AuthorizationRequestSnapshot>,
}

impl GrantRecord {
    /// Create a record with no tokens and no authorization request
    pub fn new(id: impl Into<String>, registered_client_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            registered_client_id: registered_client_id.into(),
            ..Self::default()
        }
    }

    /// Builder: set the resource owner
    pub fn with_principal_name(mut self, principal_name: impl Into<String>) -> Self {
        self.principal_name = Some(principal_name.into());
        self
    }

    /// Builder: set the authorization code
    pub fn with_authorization_code(mut self, code: impl Into<String>) -> Self {
        self.authorization_code = Some(code.into());
        self
    }

    /// Builder: set the refresh token
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Builder: attach the authorization request snapshot
    pub fn with_authorization_request(mut self, request: AuthorizationRequestSnapshot) -> Self {
        self.authorization_request = Some(request);
        self
    }

    /// Token value of the given kind, if this grant holds one
    pub fn token(&self, kind: TokenKind) -> Option<&str> {
        match kind {
            TokenKind::AuthorizationCode => self.authorization_code.as_deref(),
            TokenKind::RefreshToken => self.refresh_token.as_deref(),
        }
    }
}

/// Grant store backend failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Grant store unavailable: {message}")]
pub struct GrantStoreError {
    message: String,
}

impl GrantStoreError {
    /// Create a store error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Backend message
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Read access to issued grants
pub trait GrantStore: Send + Sync + std::fmt::Debug {
    /// Find the grant holding `token` as a token of the given kind
    ///
    /// # Errors
    ///
    /// Returns [`GrantStoreError`] when the backend cannot answer. A missing
    /// grant is `Ok(None)`.
    fn find_by_token(
        &self,
        token: &str,
        kind: TokenKind,
    ) -> Result<Option<Arc<GrantRecord>>, GrantStoreError>;
}

/// Concurrent in-memory grant store
///
/// Each record is indexed by its authorization code and its refresh token.
#[derive(Debug, Default)]
pub struct InMemoryGrantStore {
    records: DashMap<String, Arc<GrantRecord>>,
    index: DashMap<(TokenKind, String), String>,
}

impl InMemoryGrantStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record, re-indexing its tokens
    ///
    /// Tokens kept by a replacement stay resolvable throughout; only tokens
    /// the replacement no longer carries are unindexed, after it is visible.
    pub fn insert(&self, record: GrantRecord) {
        let record = Arc::new(record);
        let previous = self
            .records
            .insert(record.id.clone(), Arc::clone(&record));

        for kind in [TokenKind::AuthorizationCode, TokenKind::RefreshToken] {
            if let Some(token) = record.token(kind) {
                self.index
                    .insert((kind, token.to_string()), record.id.clone());
            }
        }

        let Some(previous) = previous else {
            return;
        };
        for kind in [TokenKind::AuthorizationCode, TokenKind::RefreshToken] {
            let Some(stale) = previous.token(kind) else {
                continue;
            };
            if record.token(kind) != Some(stale) {
                self.index
                    .remove_if(&(kind, stale.to_string()), |_, owner| *owner == record.id);
            }
        }
    }

    /// Remove a record and its token index entries
    pub fn remove(&self, id: &str) -> Option<Arc<GrantRecord>> {
        let (_, record) = self.records.remove(id)?;
        for kind in [TokenKind::AuthorizationCode, TokenKind::RefreshToken] {
            if let Some(token) = record.token(kind) {
                self.index
                    .remove_if(&(kind, token.to_string()), |_, owner| owner == id);
            }
        }
        Some(record)
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<GrantRecord> for InMemoryGrantStore {
    fn from_iter<T: IntoIterator<Item = GrantRecord>>(iter: T) -> Self {
        let store = Self::new();
        for record in iter {
            store.insert(record);
        }
        store
    }
}

impl GrantStore for InMemoryGrantStore {
    fn find_by_token(
        &self,
        token: &str,
        kind: TokenKind,
    ) -> Result<Option<Arc<GrantRecord>>, GrantStoreError> {
        let Some(id) = self
            .index
            .get(&(kind, token.to_string()))
            .map(|entry| entry.value().clone())
        else {
            return Ok(None);
        };
        Ok(self.records.get(&id).map(|entry| Arc::clone(entry.value())))
    }
}
