//! Structured Audit Logging for PKCE Decisions
//!
//! Every terminal decision of the [`CodeVerifierAuthenticator`](crate::CodeVerifierAuthenticator)
//! can be recorded as a structured `tracing` event on target `audit::pkce`.
//!
//! Presented tokens are secrets and are never logged: records carry a short
//! BLAKE3 fingerprint instead. Verifiers and challenges are never recorded.
//!
//! ## Event Types
//!
//! - [`PkceEvent::Verified`] - verifier matched the stored challenge
//! - [`PkceEvent::NotApplicable`] - PKCE did not apply to this exchange
//! - [`PkceEvent::Rejected`] - `invalid_grant`, with the offending parameter
//! - [`PkceEvent::ServerError`] - the check could not be performed
//!
//! ## Usage
//!
//! ```rust
//! use tokengate_pkce::audit::{AuditLogger, PkceEvent, fingerprint};
//!
//! let logger = AuditLogger::new("token-endpoint");
//!
//! logger.log(PkceEvent::Rejected {
//!     client_id: Some("spa".to_string()),
//!     grant_type: Some("refresh_token".to_string()),
//!     parameter: "code_verifier".to_string(),
//!     token_fingerprint: Some(fingerprint("rt1")),
//! });
//! ```

use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Short, non-reversible identifier for a secret value
pub fn fingerprint(value: &str) -> String {
    let hash = blake3::hash(value.as_bytes());
    format!("blake3:{}", &hash.to_hex()[..16])
}

/// Audit logger for PKCE decisions
#[derive(Debug, Clone)]
pub struct AuditLogger {
    /// Service name for event attribution
    service_name: String,
    /// Whether to hash client identifiers
    hash_identifiers: bool,
}

impl AuditLogger {
    /// Create a new audit logger with the given service name
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            hash_identifiers: false,
        }
    }

    /// Create a privacy-focused audit logger that also hashes client identifiers
    pub fn privacy_focused(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            hash_identifiers: true,
        }
    }

    /// Builder method to configure identifier hashing
    pub fn with_identifier_hashing(mut self, hash: bool) -> Self {
        self.hash_identifiers = hash;
        self
    }

    /// Service name attached to every record
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Log a PKCE event and return the record that was emitted
    pub fn log(&self, event: PkceEvent) -> AuditRecord {
        let record = AuditRecord {
            id: Uuid::now_v7(),
            timestamp: SystemTime::now(),
            service: self.service_name.clone(),
            event: self.redact(event),
        };

        match &record.event {
            PkceEvent::Verified {
                client_id,
                grant_type,
                token_fingerprint,
            } => {
                info!(
                    target: "audit::pkce",
                    audit_id = %record.id,
                    event_type = "pkce_verified",
                    client_id = ?client_id,
                    grant_type = %grant_type,
                    token = %token_fingerprint,
                    service = %record.service,
                    "PKCE code_verifier accepted"
                );
            }
            PkceEvent::NotApplicable {
                client_id,
                grant_type,
                reason,
            } => {
                debug!(
                    target: "audit::pkce",
                    audit_id = %record.id,
                    event_type = "pkce_not_applicable",
                    client_id = ?client_id,
                    grant_type = ?grant_type,
                    reason = %reason,
                    service = %record.service,
                    "PKCE not applicable"
                );
            }
            PkceEvent::Rejected {
                client_id,
                grant_type,
                parameter,
                token_fingerprint,
            } => {
                warn!(
                    target: "audit::pkce",
                    audit_id = %record.id,
                    event_type = "pkce_rejected",
                    client_id = ?client_id,
                    grant_type = ?grant_type,
                    parameter = %parameter,
                    token = ?token_fingerprint,
                    service = %record.service,
                    "PKCE check failed: invalid_grant"
                );
            }
            PkceEvent::ServerError { client_id, reason } => {
                error!(
                    target: "audit::pkce",
                    audit_id = %record.id,
                    event_type = "pkce_server_error",
                    client_id = ?client_id,
                    reason = %reason,
                    service = %record.service,
                    "PKCE check could not be performed"
                );
            }
        }

        record
    }

    fn maybe_hash(&self, value: Option<String>) -> Option<String> {
        if self.hash_identifiers {
            value.map(|v| fingerprint(&v))
        } else {
            value
        }
    }

    fn redact(&self, event: PkceEvent) -> PkceEvent {
        match event {
            PkceEvent::Verified {
                client_id,
                grant_type,
                token_fingerprint,
            } => PkceEvent::Verified {
                client_id: self.maybe_hash(client_id),
                grant_type,
                token_fingerprint,
            },
            PkceEvent::NotApplicable {
                client_id,
                grant_type,
                reason,
            } => PkceEvent::NotApplicable {
                client_id: self.maybe_hash(client_id),
                grant_type,
                reason,
            },
            PkceEvent::Rejected {
                client_id,
                grant_type,
                parameter,
                token_fingerprint,
            } => PkceEvent::Rejected {
                client_id: self.maybe_hash(client_id),
                grant_type,
                parameter,
                token_fingerprint,
            },
            PkceEvent::ServerError { client_id, reason } => PkceEvent::ServerError {
                client_id: self.maybe_hash(client_id),
                reason,
            },
        }
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new("tokengate")
    }
}

/// PKCE decision events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PkceEvent {
    /// The presented verifier matched the stored challenge
    Verified {
        /// Client the grant was issued to
        client_id: Option<String>,
        /// `authorization_code` or `refresh_token`
        grant_type: String,
        /// Fingerprint of the redeemed token
        token_fingerprint: String,
    },

    /// PKCE did not apply (other grant type, or no challenge and not required)
    NotApplicable {
        /// Client the grant was issued to, if a grant was found
        client_id: Option<String>,
        /// Presented grant type
        grant_type: Option<String>,
        /// Why the check did not apply
        reason: String,
    },

    /// The exchange failed with `invalid_grant`
    Rejected {
        /// Client the grant was issued to, if a grant was found
        client_id: Option<String>,
        /// Presented grant type
        grant_type: Option<String>,
        /// Parameter reported to the client
        parameter: String,
        /// Fingerprint of the presented token
        token_fingerprint: Option<String>,
    },

    /// The check failed for a server-side reason
    ServerError {
        /// Client the grant was issued to, if known
        client_id: Option<String>,
        /// Operator-facing reason
        reason: String,
    },
}

/// Audit record wrapping an event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique audit record ID
    pub id: Uuid,
    /// Timestamp of the event
    #[serde(with = "system_time_serde")]
    pub timestamp: SystemTime,
    /// Service that generated the event
    pub service: String,
    /// The audit event
    pub event: PkceEvent,
}

mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::from_secs(secs))
    }
}
