//! Common test utilities for integration tests
//!
//! Grant fixtures and instrumented grant stores shared by the scenario,
//! security and property tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokengate_pkce::{
    AuthorizationRequestSnapshot, ClientAuthenticationAttempt, CodeVerifierAuthenticator,
    GrantRecord, GrantStore, GrantStoreError, InMemoryGrantStore, TokenKind,
};

/// RFC 7636 Appendix B verifier
pub const RFC_VERIFIER: &str = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
/// RFC 7636 Appendix B S256 challenge
pub const RFC_CHALLENGE: &str = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";

/// Grant store that counts lookups and delegates to an in-memory store
#[derive(Debug, Default)]
pub struct RecordingGrantStore {
    inner: InMemoryGrantStore,
    lookups: AtomicUsize,
}

impl RecordingGrantStore {
    pub fn with_records(records: impl IntoIterator<Item = GrantRecord>) -> Self {
        Self {
            inner: InMemoryGrantStore::from_iter(records),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl GrantStore for RecordingGrantStore {
    fn find_by_token(
        &self,
        token: &str,
        kind: TokenKind,
    ) -> Result<Option<Arc<GrantRecord>>, GrantStoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_token(token, kind)
    }
}

/// Grant store whose backend is always down
#[derive(Debug, Default)]
pub struct UnavailableGrantStore;

impl GrantStore for UnavailableGrantStore {
    fn find_by_token(
        &self,
        _token: &str,
        _kind: TokenKind,
    ) -> Result<Option<Arc<GrantRecord>>, GrantStoreError> {
        Err(GrantStoreError::new("connection refused"))
    }
}

/// Grant issued for a PKCE-protected authorization request
pub fn pkce_grant(code: &str, refresh_token: &str, challenge: &str, method: &str) -> GrantRecord {
    GrantRecord::new(format!("grant-{code}"), "client-1")
        .with_principal_name("alice")
        .with_authorization_code(code)
        .with_refresh_token(refresh_token)
        .with_authorization_request(
            AuthorizationRequestSnapshot::new("spa")
                .with_redirect_uri("https://app.example.com/callback")
                .with_code_challenge(challenge, method),
        )
}

/// Grant issued without a code challenge
pub fn plain_grant(code: &str, refresh_token: &str) -> GrantRecord {
    GrantRecord::new(format!("grant-{code}"), "client-2")
        .with_authorization_code(code)
        .with_refresh_token(refresh_token)
        .with_authorization_request(AuthorizationRequestSnapshot::new("web"))
}

/// RFC 7636 Appendix B grant: code `abc`, refresh token `rt-abc`
pub fn rfc_grant() -> GrantRecord {
    pkce_grant("abc", "rt-abc", RFC_CHALLENGE, "S256")
}

/// Authenticator plus a handle on its recording store
pub fn recording_authenticator(
    records: impl IntoIterator<Item = GrantRecord>,
) -> (CodeVerifierAuthenticator, Arc<RecordingGrantStore>) {
    let store = Arc::new(RecordingGrantStore::with_records(records));
    let authenticator = CodeVerifierAuthenticator::new(store.clone());
    (authenticator, store)
}

/// `authorization_code` exchange
pub fn code_exchange(code: &str, verifier: Option<&str>) -> ClientAuthenticationAttempt {
    let attempt = ClientAuthenticationAttempt::new()
        .with_grant_type("authorization_code")
        .with_code(code);
    match verifier {
        Some(verifier) => attempt.with_code_verifier(verifier),
        None => attempt,
    }
}

/// `refresh_token` exchange
pub fn refresh_exchange(refresh_token: &str, verifier: Option<&str>) -> ClientAuthenticationAttempt {
    let attempt = ClientAuthenticationAttempt::new()
        .with_grant_type("refresh_token")
        .with_refresh_token(refresh_token);
    match verifier {
        Some(verifier) => attempt.with_code_verifier(verifier),
        None => attempt,
    }
}
