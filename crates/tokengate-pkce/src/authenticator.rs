//! Code Verifier Authenticator
//!
//! Decides whether a token request may redeem a previously issued grant by
//! checking the presented `code_verifier` against the `code_challenge` stored
//! with the original authorization request.
//!
//! The check runs for two exchanges:
//! - `grant_type=authorization_code` with a `code`
//! - `grant_type=refresh_token` with a `refresh_token`, so that refresh tokens
//!   issued from a PKCE-protected authorization stay bound to the verifier
//!
//! ## Decision Chain
//!
//! ```text
//! grant type gate ──(other grant type)──────────────────────> NotApplicable
//!       │
//! grant lookup ─────(no grant / no request snapshot)────────> invalid_grant (code)
//!       │
//! challenge ────────(blank, client requires proof key)──────> invalid_grant (code_challenge)
//!       │  └────────(blank, proof key optional)─────────────> NotApplicable
//!       │
//! verifier ─────────(blank / not S256 / mismatch)───────────> invalid_grant (code_verifier)
//!       │
//!   Verified
//! ```
//!
//! A missing grant is reported on `code` for both grant types. Token endpoint
//! clients rely on this parameter name.
//!
//! The authenticator holds no mutable state and performs at most one store
//! lookup per call, so a single instance can be shared across request handlers.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::Result;
use crate::attempt::ClientAuthenticationAttempt;
use crate::audit::{AuditLogger, PkceEvent, fingerprint};
use crate::client::{ClientAuthenticationMethod, ClientPolicy, RegisteredClient};
use crate::error::PkceError;
use crate::grant::GrantStore;
use crate::params;
use crate::pkce::{has_text, verify_code_verifier};

/// Successful result of a PKCE check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PkceOutcome {
    /// The verifier matched the stored S256 challenge
    Verified,
    /// PKCE does not apply to this exchange; the caller authenticates the client by other means
    NotApplicable,
}

impl PkceOutcome {
    /// Whether the verifier was checked and accepted
    pub const fn is_verified(self) -> bool {
        matches!(self, Self::Verified)
    }
}

/// PKCE `code_verifier` authenticator for the token endpoint
#[derive(Debug, Clone)]
pub struct CodeVerifierAuthenticator {
    grant_store: Arc<dyn GrantStore>,
    audit: Option<AuditLogger>,
}

impl CodeVerifierAuthenticator {
    /// Create an authenticator reading grants from `grant_store`
    pub fn new(grant_store: Arc<dyn GrantStore>) -> Self {
        Self {
            grant_store,
            audit: None,
        }
    }

    /// Record every decision with `logger`
    pub fn with_audit_logger(mut self, logger: AuditLogger) -> Self {
        self.audit = Some(logger);
        self
    }

    /// Require a successful PKCE check
    ///
    /// Used when the exchange must be protected by PKCE, e.g. for public
    /// clients that have no other credential.
    ///
    /// # Errors
    ///
    /// Returns [`PkceError::InvalidGrant`] on `code_verifier` when PKCE does
    /// not apply, plus every error of [`Self::authenticate`].
    pub fn authenticate_required<P>(
        &self,
        attempt: &ClientAuthenticationAttempt,
        client: &P,
    ) -> Result<()>
    where
        P: ClientPolicy + ?Sized,
    {
        self.decide(attempt, client, true).map(|_| ())
    }

    /// Run the PKCE check when it applies
    ///
    /// A [`PkceOutcome::NotApplicable`] result is not an error: confidential
    /// clients without a stored challenge pass through to their regular
    /// client authentication.
    ///
    /// # Errors
    ///
    /// Same as [`Self::authenticate`].
    pub fn authenticate_if_available<P>(
        &self,
        attempt: &ClientAuthenticationAttempt,
        client: &P,
    ) -> Result<PkceOutcome>
    where
        P: ClientPolicy + ?Sized,
    {
        self.authenticate(attempt, client)
    }

    /// Pick the enforcement mode from the client authentication method
    ///
    /// Public clients (`none`) must pass PKCE; every other method runs the
    /// check only when it applies.
    ///
    /// # Errors
    ///
    /// Same as [`Self::authenticate_required`] for public clients and
    /// [`Self::authenticate_if_available`] otherwise.
    pub fn authenticate_client(
        &self,
        attempt: &ClientAuthenticationAttempt,
        client: &RegisteredClient,
        method: ClientAuthenticationMethod,
    ) -> Result<PkceOutcome> {
        if method.is_public() {
            self.authenticate_required(attempt, client)?;
            Ok(PkceOutcome::Verified)
        } else {
            self.authenticate_if_available(attempt, client)
        }
    }

    /// Run the full decision chain and return the raw outcome
    ///
    /// # Errors
    ///
    /// - [`PkceError::InvalidGrant`] on `code` when no grant (or no stored
    ///   authorization request) matches the presented token
    /// - [`PkceError::InvalidGrant`] on `code_challenge` when no challenge was
    ///   stored but the client requires one
    /// - [`PkceError::InvalidGrant`] on `code_verifier` when the verifier is
    ///   blank, the method is not `S256`, or the challenge does not match
    /// - [`PkceError::ServerError`] when the grant store fails
    pub fn authenticate<P>(
        &self,
        attempt: &ClientAuthenticationAttempt,
        client: &P,
    ) -> Result<PkceOutcome>
    where
        P: ClientPolicy + ?Sized,
    {
        self.decide(attempt, client, false)
    }

    /// Decision chain; in `required` mode "not applicable" is rejected on
    /// `code_verifier` and never audited as [`PkceEvent::NotApplicable`]
    fn decide<P>(
        &self,
        attempt: &ClientAuthenticationAttempt,
        client: &P,
        required: bool,
    ) -> Result<PkceOutcome>
    where
        P: ClientPolicy + ?Sized,
    {
        let Some((token, kind)) = attempt.presented_token() else {
            if required {
                return Err(self.reject(attempt, None, None, params::CODE_VERIFIER));
            }
            debug!(
                grant_type = ?attempt.grant_type,
                "PKCE not applicable to this grant type"
            );
            self.audit(|| PkceEvent::NotApplicable {
                client_id: None,
                grant_type: attempt.grant_type.clone(),
                reason: "grant type does not redeem a PKCE-bound grant".to_string(),
            });
            return Ok(PkceOutcome::NotApplicable);
        };

        let grant = self.grant_store.find_by_token(token, kind).map_err(|err| {
            error!(error = %err, token_kind = %kind, "Grant lookup failed");
            self.audit(|| PkceEvent::ServerError {
                client_id: None,
                reason: err.to_string(),
            });
            PkceError::server_error(err.to_string())
        })?;

        let Some(request) = grant
            .as_deref()
            .and_then(|grant| grant.authorization_request.as_ref())
        else {
            debug!(token_kind = %kind, found = grant.is_some(), "No authorization request for token");
            return Err(self.reject(attempt, None, Some(token), params::CODE));
        };
        let client_id = Some(request.client_id.as_str());

        let Some(challenge) = request.code_challenge().filter(|c| has_text(Some(*c))) else {
            if client.require_proof_key() {
                return Err(self.reject(attempt, client_id, Some(token), params::CODE_CHALLENGE));
            }
            if required {
                return Err(self.reject(attempt, client_id, Some(token), params::CODE_VERIFIER));
            }
            self.audit(|| PkceEvent::NotApplicable {
                client_id: client_id.map(str::to_string),
                grant_type: attempt.grant_type.clone(),
                reason: "no code_challenge stored and proof key not required".to_string(),
            });
            return Ok(PkceOutcome::NotApplicable);
        };

        if !verify_code_verifier(
            attempt.code_verifier.as_deref(),
            challenge,
            request.code_challenge_method(),
        ) {
            return Err(self.reject(attempt, client_id, Some(token), params::CODE_VERIFIER));
        }

        debug!(token_kind = %kind, "PKCE code_verifier accepted");
        self.audit(|| PkceEvent::Verified {
            client_id: client_id.map(str::to_string),
            grant_type: kind.grant_type().to_string(),
            token_fingerprint: fingerprint(token),
        });
        Ok(PkceOutcome::Verified)
    }

    fn reject(
        &self,
        attempt: &ClientAuthenticationAttempt,
        client_id: Option<&str>,
        token: Option<&str>,
        parameter: &'static str,
    ) -> PkceError {
        warn!(
            grant_type = ?attempt.grant_type,
            parameter,
            "PKCE check failed: invalid_grant"
        );
        self.audit(|| PkceEvent::Rejected {
            client_id: client_id.map(str::to_string),
            grant_type: attempt.grant_type.clone(),
            parameter: parameter.to_string(),
            token_fingerprint: token.map(fingerprint),
        });
        PkceError::invalid_grant(parameter)
    }

    fn audit(&self, event: impl FnOnce() -> PkceEvent) {
        if let Some(logger) = &self.audit {
            logger.log(event());
        }
    }
}
