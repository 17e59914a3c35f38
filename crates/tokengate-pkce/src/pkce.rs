//! PKCE Code Verifier Transform (RFC 7636)
//!
//! Only the `S256` method is supported:
//!
//! ```text
//! code_challenge = BASE64URL-ENCODE(SHA256(ASCII(code_verifier)))
//! ```
//!
//! The `plain` method is rejected, as is any unknown or missing
//! method. A client that registered a `plain` challenge can never redeem the
//! grant, which closes the PKCE downgrade path.
//!
//! ## Security Properties
//!
//! - **Constant-time comparison**: the derived challenge is compared with the
//!   stored one using `subtle::ConstantTimeEq`.
//! - **No plaintext fallback**: a missing method never degrades to `plain`.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Wire value of the S256 method
pub const S256: &str = "S256";

/// Code challenge method stored with the authorization request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CodeChallengeMethod {
    /// SHA-256 transform
    S256,
    /// Anything else, including `plain`. Verification always fails.
    Unsupported(String),
}

impl CodeChallengeMethod {
    /// Parse a stored method value. Matching is exact: `s256` is unsupported.
    pub fn parse(value: &str) -> Self {
        if value == S256 {
            Self::S256
        } else {
            Self::Unsupported(value.to_string())
        }
    }

    /// Wire value
    pub fn as_str(&self) -> &str {
        match self {
            Self::S256 => S256,
            Self::Unsupported(value) => value,
        }
    }
}

impl fmt::Display for CodeChallengeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `value` is present and contains at least one non-whitespace character
///
/// Whitespace is the set in [`is_blank_char`], not Unicode `White_Space`.
#[inline]
pub fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.chars().any(|c| !is_blank_char(c)))
}

/// Characters that count as blank for [`has_text`]
///
/// ASCII controls `\t`..=`\r` and `U+001C`..=`U+001F`, the space, and the
/// Unicode space, line and paragraph separators except the non-breaking ones
/// (`U+00A0`, `U+2007`, `U+202F`). `U+0085` is not blank.
#[inline]
pub const fn is_blank_char(c: char) -> bool {
    matches!(
        c,
        '\t'..='\r'
            | '\u{1C}'..='\u{1F}'
            | ' '
            | '\u{1680}'
            | '\u{2000}'..='\u{2006}'
            | '\u{2008}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{205F}'
            | '\u{3000}'
    )
}

/// US-ASCII encoding of the verifier; each non-ASCII character becomes `?`
fn ascii_bytes(verifier: &str) -> Vec<u8> {
    verifier
        .chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
        .collect()
}

/// Derive the S256 code challenge for a verifier
///
/// # Example
///
/// ```rust
/// use tokengate_pkce::s256_challenge;
///
/// // RFC 7636 Appendix B
/// assert_eq!(
///     s256_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
///     "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
/// );
/// ```
pub fn s256_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(ascii_bytes(verifier));
    URL_SAFE_NO_PAD.encode(digest)
}

/// Compare a presented `code_verifier` with the stored challenge
///
/// Returns `false` when the verifier is absent or blank, when the method is
/// anything other than `S256`, or when the derived challenge differs from the
/// stored one.
#[must_use]
pub fn verify_code_verifier(
    code_verifier: Option<&str>,
    code_challenge: &str,
    code_challenge_method: Option<&str>,
) -> bool {
    let Some(verifier) = code_verifier.filter(|v| has_text(Some(*v))) else {
        return false;
    };

    match code_challenge_method.map(CodeChallengeMethod::parse) {
        Some(CodeChallengeMethod::S256) => {
            let derived = s256_challenge(verifier);
            derived.as_bytes().ct_eq(code_challenge.as_bytes()).into()
        }
        Some(CodeChallengeMethod::Unsupported(method)) => {
            tracing::debug!(method = %method, "Unsupported code_challenge_method");
            false
        }
        None => false,
    }
}
