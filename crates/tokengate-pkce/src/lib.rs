//! # Tokengate PKCE - Code Verifier Authentication
//!
//! Server-side PKCE (RFC 7636) verification for an OAuth 2.0 token endpoint.
//! The [`CodeVerifierAuthenticator`] decides whether a client presenting a
//! `code_verifier` may redeem a previously issued grant. It covers
//! `authorization_code` exchanges and `refresh_token` exchanges that are bound
//! to an original PKCE-protected authorization.
//!
//! The authenticator does not issue, revoke, or persist tokens. It reads one
//! grant from a [`GrantStore`] and returns an explicit outcome.
//!
//! ## Architecture
//!
//! - [`authenticator`] - The decision chain (`authenticate_required`, `authenticate_if_available`)
//! - [`pkce`] - S256 transform and verifier comparison
//! - [`attempt`] - Typed token request parameters
//! - [`grant`] - Grant records and the grant store boundary
//! - [`client`] - Registered client policy (`require_proof_key`)
//! - [`error`] - `invalid_grant` / `server_error` failures and their wire shape
//! - [`audit`] - Structured audit events for every decision
//! - [`params`] - Fixed wire parameter names, grant types, token kinds
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tokengate_pkce::{
//!     AuthorizationRequestSnapshot, ClientAuthenticationAttempt, ClientSettings,
//!     CodeVerifierAuthenticator, GrantRecord, InMemoryGrantStore, PkceOutcome,
//! };
//!
//! let store = Arc::new(InMemoryGrantStore::new());
//! store.insert(
//!     GrantRecord::new("grant-1", "client-1")
//!         .with_authorization_code("abc")
//!         .with_authorization_request(
//!             AuthorizationRequestSnapshot::new("spa").with_code_challenge(
//!                 "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM",
//!                 "S256",
//!             ),
//!         ),
//! );
//!
//! let authenticator = CodeVerifierAuthenticator::new(store);
//! let attempt = ClientAuthenticationAttempt::from_parameters([
//!     ("grant_type", "authorization_code"),
//!     ("code", "abc"),
//!     ("code_verifier", "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
//! ]);
//!
//! let outcome = authenticator
//!     .authenticate_if_available(&attempt, &ClientSettings::default())
//!     .unwrap();
//! assert_eq!(outcome, PkceOutcome::Verified);
//! ```
//!
//! ## Standards Compliance
//!
//! - **RFC 6749** - OAuth 2.0 Authorization Framework (error response shape)
//! - **RFC 7636** - Proof Key for Code Exchange (S256 only; `plain` is rejected)

pub mod attempt;
pub mod audit;
pub mod authenticator;
pub mod client;
pub mod error;
pub mod grant;
pub mod params;
pub mod pkce;

#[doc(inline)]
pub use attempt::ClientAuthenticationAttempt;

#[doc(inline)]
pub use audit::{AuditLogger, PkceEvent};

#[doc(inline)]
pub use authenticator::{CodeVerifierAuthenticator, PkceOutcome};

#[doc(inline)]
pub use client::{ClientAuthenticationMethod, ClientPolicy, ClientSettings, RegisteredClient};

#[doc(inline)]
pub use error::{OAuth2ErrorCode, OAuth2ErrorResponse, PkceError};

#[doc(inline)]
pub use grant::{
    AuthorizationRequestSnapshot, GrantRecord, GrantStore, GrantStoreError, InMemoryGrantStore,
    PkceParameters,
};

#[doc(inline)]
pub use params::{GrantType, TokenKind};

#[doc(inline)]
pub use pkce::{CodeChallengeMethod, s256_challenge, verify_code_verifier};

/// PKCE result type
pub type Result<T> = std::result::Result<T, PkceError>;
