//! Token exchange scenarios
//!
//! End-to-end decisions of the authenticator for authorization_code and
//! refresh_token exchanges, including the exact error parameter reported to
//! the client.

mod common;

use std::sync::Arc;

use common::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokengate_pkce::{
    AuditLogger, ClientAuthenticationAttempt, ClientAuthenticationMethod, ClientSettings,
    CodeVerifierAuthenticator, GrantRecord, InMemoryGrantStore, PkceError, PkceOutcome,
    RegisteredClient, s256_challenge,
};

/// Test: RFC 7636 Appendix B vector redeems the authorization code
#[test]
fn test_authorization_code_with_rfc_vector() {
    // GIVEN: A grant stored with the RFC challenge under code "abc"
    let (authenticator, store) = recording_authenticator([rfc_grant()]);

    // WHEN: The client presents the matching verifier
    let outcome = authenticator
        .authenticate_if_available(
            &code_exchange("abc", Some(RFC_VERIFIER)),
            &ClientSettings::default(),
        )
        .unwrap();

    // THEN: The exchange is verified after exactly one lookup
    assert_eq!(outcome, PkceOutcome::Verified);
    assert_eq!(store.lookups(), 1);
}

/// Test: wrong verifier fails with invalid_grant on code_verifier
#[test]
fn test_wrong_verifier_reports_code_verifier() {
    let (authenticator, _) = recording_authenticator([rfc_grant()]);

    let err = authenticator
        .authenticate_required(
            &code_exchange("abc", Some("wrong")),
            &ClientSettings::default(),
        )
        .unwrap_err();

    assert_eq!(err, PkceError::invalid_grant("code_verifier"));
    assert_eq!(
        serde_json::to_value(err.to_error_response()).unwrap(),
        json!({
            "error": "invalid_grant",
            "error_description": "Client authentication failed: code_verifier",
        })
    );
}

/// Test: unknown refresh token is reported on "code", not "refresh_token"
#[test]
fn test_unknown_refresh_token_reports_code() {
    let (authenticator, store) = recording_authenticator(Vec::<GrantRecord>::new());

    let err = authenticator
        .authenticate_required(
            &refresh_exchange("rt1", Some(RFC_VERIFIER)),
            &ClientSettings::default(),
        )
        .unwrap_err();

    assert_eq!(err, PkceError::invalid_grant("code"));
    assert_eq!(
        err.to_string(),
        "Client authentication failed: code"
    );
    assert_eq!(store.lookups(), 1);
}

/// Test: unknown authorization code is reported on "code"
#[test]
fn test_unknown_authorization_code_reports_code() {
    let (authenticator, _) = recording_authenticator([rfc_grant()]);

    let err = authenticator
        .authenticate_if_available(
            &code_exchange("does-not-exist", Some(RFC_VERIFIER)),
            &ClientSettings::default(),
        )
        .unwrap_err();

    assert_eq!(err, PkceError::invalid_grant("code"));
}

/// Test: refresh token issued from a PKCE authorization stays bound to the verifier
#[test]
fn test_refresh_token_bound_to_original_verifier() {
    let (authenticator, _) = recording_authenticator([rfc_grant()]);
    let policy = ClientSettings::default();

    assert_eq!(
        authenticator
            .authenticate_if_available(&refresh_exchange("rt-abc", Some(RFC_VERIFIER)), &policy)
            .unwrap(),
        PkceOutcome::Verified
    );

    let err = authenticator
        .authenticate_if_available(&refresh_exchange("rt-abc", None), &policy)
        .unwrap_err();
    assert_eq!(err, PkceError::invalid_grant("code_verifier"));
}

/// Test: grant types other than authorization_code / refresh_token never touch the store
#[test]
fn test_other_grant_types_skip_lookup() {
    let (authenticator, store) = recording_authenticator([rfc_grant()]);

    for grant_type in [
        "client_credentials",
        "password",
        "urn:ietf:params:oauth:grant-type:device_code",
        "urn:ietf:params:oauth:grant-type:token-exchange",
        "",
    ] {
        let attempt = ClientAuthenticationAttempt::new()
            .with_grant_type(grant_type)
            .with_code("abc")
            .with_refresh_token("rt-abc")
            .with_code_verifier(RFC_VERIFIER);

        let outcome = authenticator
            .authenticate_if_available(&attempt, &ClientSettings::requiring_proof_key())
            .unwrap();
        assert_eq!(outcome, PkceOutcome::NotApplicable, "grant_type={grant_type}");
    }

    assert_eq!(store.lookups(), 0);
}

/// Test: grant_type present but its token parameter missing is not applicable
#[test]
fn test_missing_token_parameter_skips_lookup() {
    let (authenticator, store) = recording_authenticator([rfc_grant()]);

    let attempt = ClientAuthenticationAttempt::from_parameters([
        ("grant_type", "refresh_token"),
        ("code", "abc"),
        ("code_verifier", RFC_VERIFIER),
    ]);
    assert_eq!(
        authenticator
            .authenticate_if_available(&attempt, &ClientSettings::default())
            .unwrap(),
        PkceOutcome::NotApplicable
    );
    assert_eq!(store.lookups(), 0);
}

/// Test: no stored challenge and PKCE optional passes through silently
#[test]
fn test_no_challenge_optional_is_not_applicable() {
    let (authenticator, _) = recording_authenticator([plain_grant("code-1", "rt-1")]);

    let outcome = authenticator
        .authenticate_if_available(&code_exchange("code-1", None), &ClientSettings::default())
        .unwrap();
    assert_eq!(outcome, PkceOutcome::NotApplicable);
}

/// Test: no stored challenge while the client requires PKCE
#[test]
fn test_no_challenge_required_reports_code_challenge() {
    let (authenticator, _) = recording_authenticator([plain_grant("code-1", "rt-1")]);

    let err = authenticator
        .authenticate_if_available(
            &refresh_exchange("rt-1", Some(RFC_VERIFIER)),
            &ClientSettings::requiring_proof_key(),
        )
        .unwrap_err();
    assert_eq!(err, PkceError::invalid_grant("code_challenge"));
}

/// Test: blank stored challenge is treated like a missing one
#[test]
fn test_blank_challenge_treated_as_absent() {
    let (authenticator, _) = recording_authenticator([
        pkce_grant("empty", "rt-empty", "", "S256"),
        pkce_grant("spaces", "rt-spaces", "   ", "S256"),
    ]);

    for code in ["empty", "spaces"] {
        assert_eq!(
            authenticator
                .authenticate_if_available(
                    &code_exchange(code, Some(RFC_VERIFIER)),
                    &ClientSettings::default()
                )
                .unwrap(),
            PkceOutcome::NotApplicable
        );
        assert_eq!(
            authenticator
                .authenticate_if_available(
                    &code_exchange(code, Some(RFC_VERIFIER)),
                    &ClientSettings::requiring_proof_key()
                )
                .unwrap_err(),
            PkceError::invalid_grant("code_challenge")
        );
    }
}

/// Test: required mode turns "not applicable" into a code_verifier failure
#[test]
fn test_required_mode_rejects_not_applicable() {
    let (authenticator, _) = recording_authenticator([plain_grant("code-1", "rt-1")]);

    let err = authenticator
        .authenticate_required(&code_exchange("code-1", None), &ClientSettings::default())
        .unwrap_err();
    assert_eq!(err, PkceError::invalid_grant("code_verifier"));
}

/// Test: grant store failure surfaces as server_error
#[test]
fn test_store_failure_is_server_error() {
    let authenticator = CodeVerifierAuthenticator::new(Arc::new(UnavailableGrantStore));

    let err = authenticator
        .authenticate_if_available(
            &code_exchange("abc", Some(RFC_VERIFIER)),
            &ClientSettings::default(),
        )
        .unwrap_err();

    assert!(!err.is_client_error());
    assert_eq!(
        serde_json::to_value(err.to_error_response()).unwrap(),
        json!({ "error": "server_error" })
    );
}

/// Test: record found but without an authorization request snapshot
#[test]
fn test_grant_without_snapshot_reports_code() {
    let (authenticator, _) = recording_authenticator([GrantRecord::new("g", "client-1")
        .with_refresh_token("rt-orphan")]);

    let err = authenticator
        .authenticate_if_available(
            &refresh_exchange("rt-orphan", Some(RFC_VERIFIER)),
            &ClientSettings::default(),
        )
        .unwrap_err();
    assert_eq!(err, PkceError::invalid_grant("code"));
}

/// Test: public and confidential clients pick their enforcement mode
#[test]
fn test_authenticate_client_by_method() {
    let store = Arc::new(InMemoryGrantStore::from_iter([
        rfc_grant(),
        plain_grant("code-1", "rt-1"),
    ]));
    let authenticator =
        CodeVerifierAuthenticator::new(store).with_audit_logger(AuditLogger::new("scenarios"));

    let public = RegisteredClient::new("client-1", "spa")
        .with_authentication_method(ClientAuthenticationMethod::None);
    let confidential = RegisteredClient::new("client-2", "web")
        .with_authentication_method(ClientAuthenticationMethod::ClientSecretBasic);

    assert_eq!(
        authenticator
            .authenticate_client(
                &code_exchange("abc", Some(RFC_VERIFIER)),
                &public,
                ClientAuthenticationMethod::None
            )
            .unwrap(),
        PkceOutcome::Verified
    );

    assert_eq!(
        authenticator
            .authenticate_client(
                &code_exchange("code-1", None),
                &confidential,
                ClientAuthenticationMethod::ClientSecretBasic
            )
            .unwrap(),
        PkceOutcome::NotApplicable
    );

    assert_eq!(
        authenticator
            .authenticate_client(
                &code_exchange("code-1", None),
                &public,
                ClientAuthenticationMethod::None
            )
            .unwrap_err(),
        PkceError::invalid_grant("code_verifier")
    );
}

/// Test: form-encoded token request end to end
#[test]
fn test_form_encoded_request() {
    let (authenticator, _) = recording_authenticator([rfc_grant()]);

    let attempt = ClientAuthenticationAttempt::from_form_urlencoded(
        "grant_type=authorization_code&code=abc&redirect_uri=https%3A%2F%2Fapp.example.com%2Fcallback\
         &code_verifier=dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk",
    );

    assert_eq!(
        authenticator
            .authenticate_if_available(&attempt, &ClientSettings::default())
            .unwrap(),
        PkceOutcome::Verified
    );
}

/// Test: repeated calls give the same answer
#[test]
fn test_decisions_are_repeatable() {
    let (authenticator, store) = recording_authenticator([rfc_grant()]);
    let attempt = code_exchange("abc", Some(RFC_VERIFIER));

    for _ in 0..3 {
        assert!(
            authenticator
                .authenticate_required(&attempt, &ClientSettings::default())
                .is_ok()
        );
    }
    assert_eq!(store.lookups(), 3);
}

/// Test: only the blank character set counts as a missing challenge
#[test]
fn test_challenge_blankness_uses_blank_character_set() {
    // GIVEN: Challenges made of non-breaking spaces and of a separator control
    let (authenticator, _) = recording_authenticator([
        pkce_grant("nbsp", "rt-nbsp", "\u{a0}", "S256"),
        pkce_grant("figure", "rt-figure", "\u{2007}", "S256"),
        pkce_grant("unit-sep", "rt-unit-sep", "\u{1f}", "S256"),
    ]);
    let policy = ClientSettings::default();

    // WHEN/THEN: Non-breaking spaces are text, so the verifier is compared and fails
    for code in ["nbsp", "figure"] {
        assert_eq!(
            authenticator
                .authenticate_if_available(&code_exchange(code, Some(RFC_VERIFIER)), &policy)
                .unwrap_err(),
            PkceError::invalid_grant("code_verifier"),
            "code={code}"
        );
    }

    // WHEN/THEN: U+001F is blank, so the challenge is treated as absent
    assert_eq!(
        authenticator
            .authenticate_if_available(&code_exchange("unit-sep", Some(RFC_VERIFIER)), &policy)
            .unwrap(),
        PkceOutcome::NotApplicable
    );
    assert_eq!(
        authenticator
            .authenticate_if_available(
                &code_exchange("unit-sep", Some(RFC_VERIFIER)),
                &ClientSettings::requiring_proof_key()
            )
            .unwrap_err(),
        PkceError::invalid_grant("code_challenge")
    );
}

/// Test: verifier blankness uses the same character set
#[test]
fn test_verifier_blankness_uses_blank_character_set() {
    // GIVEN: Grants whose challenges are the S256 transform of the presented values
    let (authenticator, _) = recording_authenticator([
        pkce_grant("nbsp", "rt-nbsp", &s256_challenge("\u{a0}"), "S256"),
        pkce_grant("unit-sep", "rt-unit-sep", &s256_challenge("\u{1f}"), "S256"),
    ]);
    let policy = ClientSettings::default();

    // THEN: A non-breaking space verifier is compared and matches
    assert_eq!(
        authenticator
            .authenticate_if_available(&code_exchange("nbsp", Some("\u{a0}")), &policy)
            .unwrap(),
        PkceOutcome::Verified
    );

    // THEN: A U+001F verifier is blank and never matches
    assert_eq!(
        authenticator
            .authenticate_if_available(&code_exchange("unit-sep", Some("\u{1f}")), &policy)
            .unwrap_err(),
        PkceError::invalid_grant("code_verifier")
    );
}
