// src/models/credential.rs
//! Credential record data model.
//!
//! A credential is a tamper-evident record asserting that a subject holds an
//! attested artifact. The artifact itself lives in external content-addressed
//! storage; the record only carries the opaque reference returned by it.

use crate::models::identity::{CredentialId, Identity};
use serde::{Deserialize, Serialize};

/// Registry record of a single issued credential.
///
/// Everything except `revoked` is fixed at issuance, and `revoked` only ever
/// moves from `false` to `true`.
///
/// # Fields
/// - `id`: deterministic ID derived from the issuance tuple
/// - `content_ref`: opaque handle into external document storage
/// - `issuer`: identity of the issuing organization
/// - `subject`: identity the credential is about
/// - `credential_type`: free-form type tag, e.g. `"degree"`
/// - `issue_date`: issuance time, seconds since the Unix epoch
/// - `expiry_date`: expiry time in seconds, `0` for never
/// - `revoked`: one-way revocation flag
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub id: CredentialId,
    pub content_ref: String,
    pub issuer: Identity,
    pub subject: Identity,
    pub credential_type: String,
    pub issue_date: u64,
    pub expiry_date: u64,
    pub revoked: bool,
}

impl Credential {
    /// Returns `true` if the credential has an expiry that `now` has reached.
    pub fn is_expired(&self, now: u64) -> bool {
        self.expiry_date != 0 && now >= self.expiry_date
    }
}

/// Why a credential is, or is not, currently valid.
///
/// Reasons are checked in declaration order, so a revoked credential that has
/// also expired reports `Revoked`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStatus {
    Revoked,
    Expired,
    IssuerDeauthorized,
    Active,
}

impl CredentialStatus {
    /// Derives the status of `credential` at time `now`.
    pub fn evaluate(credential: &Credential, now: u64, issuer_authorized: bool) -> Self {
        if credential.revoked {
            CredentialStatus::Revoked
        } else if credential.is_expired(now) {
            CredentialStatus::Expired
        } else if !issuer_authorized {
            CredentialStatus::IssuerDeauthorized
        } else {
            CredentialStatus::Active
        }
    }

    pub fn is_valid(self) -> bool {
        self == CredentialStatus::Active
    }
}

/// Answer returned to third-party verifiers.
///
/// `is_valid` is recomputed on every read and never stored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub is_valid: bool,
    pub issuer: Identity,
    pub subject: Identity,
    pub credential_type: String,
    pub issue_date: u64,
    pub expiry_date: u64,
    pub is_revoked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(expiry_date: u64, revoked: bool) -> Credential {
        Credential {
            id: CredentialId::from_bytes([9u8; 32]),
            content_ref: "bafy-sample".to_string(),
            issuer: Identity::from_bytes([1u8; 20]),
            subject: Identity::from_bytes([2u8; 20]),
            credential_type: "degree".to_string(),
            issue_date: 100,
            expiry_date,
            revoked,
        }
    }

    #[test]
    fn test_zero_expiry_never_expires() {
        assert!(!sample(0, false).is_expired(u64::MAX));
    }

    #[test]
    fn test_expiry_is_inclusive() {
        let credential = sample(200, false);
        assert!(!credential.is_expired(199));
        assert!(credential.is_expired(200));
    }

    #[test]
    fn test_status_precedence() {
        assert_eq!(CredentialStatus::evaluate(&sample(150, true), 300, false), CredentialStatus::Revoked);
        assert_eq!(CredentialStatus::evaluate(&sample(150, false), 300, false), CredentialStatus::Expired);
        assert_eq!(
            CredentialStatus::evaluate(&sample(0, false), 300, false),
            CredentialStatus::IssuerDeauthorized
        );
        assert!(CredentialStatus::evaluate(&sample(0, false), 300, true).is_valid());
    }
}
