//! Command implementations

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokengate_pkce::pkce::{S256, has_text};
use tokengate_pkce::{
    AuditLogger, ClientAuthenticationAttempt, ClientAuthenticationMethod,
    CodeVerifierAuthenticator, PkceOutcome, RegisteredClient, s256_challenge,
};

use crate::cli::{VerifyArgs, VerifyMode};
use crate::config::TokengateConfig;
use crate::error::{CliError, CliResult};

/// Service name recorded in audit events
const AUDIT_SERVICE: &str = "tokengate-cli";

/// Derived code challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeReport {
    pub code_challenge: String,
    pub code_challenge_method: &'static str,
}

impl fmt::Display for ChallengeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code_challenge)
    }
}

/// Result of a successful `verify`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub client_id: String,
    pub grant_type: String,
    pub mode: VerifyMode,
    pub outcome: &'static str,
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            "verified" => write!(f, "PKCE verified for client '{}'", self.client_id),
            _ => write!(
                f,
                "PKCE not applicable for client '{}' ({})",
                self.client_id, self.grant_type
            ),
        }
    }
}

/// Compute the S256 challenge for `verifier`
///
/// # Errors
///
/// Returns [`CliError::InvalidArguments`] for a blank verifier.
pub fn challenge(verifier: &str) -> CliResult<ChallengeReport> {
    if !has_text(Some(verifier)) {
        return Err(CliError::InvalidArguments(
            "code verifier must not be blank".to_string(),
        ));
    }

    Ok(ChallengeReport {
        code_challenge: s256_challenge(verifier),
        code_challenge_method: S256,
    })
}

/// Replay the token endpoint PKCE check against configured grants
///
/// # Errors
///
/// - [`CliError::UnknownClient`] when `--client-id` is not configured
/// - [`CliError::Pkce`] when the check fails
pub fn verify(config: &TokengateConfig, args: &VerifyArgs) -> CliResult<VerifyReport> {
    let client = config
        .find_client(&args.client_id)
        .ok_or_else(|| CliError::UnknownClient(args.client_id.clone()))?;

    let attempt = build_attempt(args);
    let authenticator = CodeVerifierAuthenticator::new(Arc::new(config.grant_store()))
        .with_audit_logger(AuditLogger::new(AUDIT_SERVICE));

    let outcome = match args.mode {
        VerifyMode::Required => {
            authenticator.authenticate_required(&attempt, client)?;
            PkceOutcome::Verified
        }
        VerifyMode::IfAvailable => authenticator.authenticate_if_available(&attempt, client)?,
        VerifyMode::Auto => {
            authenticator.authenticate_client(&attempt, client, authentication_method(client))?
        }
    };

    tracing::debug!(client_id = %args.client_id, ?outcome, "verify finished");

    Ok(VerifyReport {
        client_id: args.client_id.clone(),
        grant_type: args.grant_type.clone(),
        mode: args.mode,
        outcome: if outcome.is_verified() {
            "verified"
        } else {
            "not_applicable"
        },
    })
}

fn build_attempt(args: &VerifyArgs) -> ClientAuthenticationAttempt {
    let mut attempt = ClientAuthenticationAttempt::new().with_grant_type(&args.grant_type);
    if let Some(code) = &args.code {
        attempt = attempt.with_code(code);
    }
    if let Some(refresh_token) = &args.refresh_token {
        attempt = attempt.with_refresh_token(refresh_token);
    }
    if let Some(verifier) = &args.code_verifier {
        attempt = attempt.with_code_verifier(verifier);
    }
    attempt
}

/// Method the client would authenticate with at the token endpoint
fn authentication_method(client: &RegisteredClient) -> ClientAuthenticationMethod {
    if client.supports_authentication_method(ClientAuthenticationMethod::None) {
        ClientAuthenticationMethod::None
    } else {
        client
            .client_authentication_methods
            .first()
            .copied()
            .unwrap_or(ClientAuthenticationMethod::ClientSecretBasic)
    }
}
