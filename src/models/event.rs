// src/models/event.rs
//! Notification records emitted on every committed registry mutation.
//!
//! External indexers consume these to rebuild history without scanning the
//! full state. Each record is stamped with a gap-free sequence number.

use crate::models::identity::{CredentialId, Identity};
use serde::{Deserialize, Serialize};

/// Payload of a registry event.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegistryEvent {
    IssuerAdded {
        issuer: Identity,
        name: String,
        country: String,
    },
    IssuerRemoved {
        issuer: Identity,
    },
    CredentialIssued {
        credential_id: CredentialId,
        issuer: Identity,
        subject: Identity,
        credential_type: String,
        content_ref: String,
        expiry_date: u64,
    },
    CredentialRevoked {
        credential_id: CredentialId,
        issuer: Identity,
        revoked_by: Identity,
    },
    Paused {
        by: Identity,
    },
    Unpaused {
        by: Identity,
    },
    OwnershipTransferred {
        previous_owner: Identity,
        new_owner: Identity,
    },
}

impl RegistryEvent {
    /// Stable name of the event kind, matching the serialized `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            RegistryEvent::IssuerAdded { .. } => "issuer_added",
            RegistryEvent::IssuerRemoved { .. } => "issuer_removed",
            RegistryEvent::CredentialIssued { .. } => "credential_issued",
            RegistryEvent::CredentialRevoked { .. } => "credential_revoked",
            RegistryEvent::Paused { .. } => "paused",
            RegistryEvent::Unpaused { .. } => "unpaused",
            RegistryEvent::OwnershipTransferred { .. } => "ownership_transferred",
        }
    }

    /// Credential the event concerns, if any.
    pub fn credential_id(&self) -> Option<CredentialId> {
        match self {
            RegistryEvent::CredentialIssued { credential_id, .. }
            | RegistryEvent::CredentialRevoked { credential_id, .. } => Some(*credential_id),
            _ => None,
        }
    }
}

/// A committed event together with its position in the log.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub sequence: u64,
    pub timestamp: u64,
    #[serde(flatten)]
    pub event: RegistryEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_serialized_tag() {
        let event = RegistryEvent::Paused { by: Identity::from_bytes([7u8; 20]) };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["kind"], event.kind());
    }

    #[test]
    fn test_record_flattens_event_fields() {
        let record = EventRecord {
            sequence: 3,
            timestamp: 1_700_000_000,
            event: RegistryEvent::IssuerRemoved { issuer: Identity::from_bytes([1u8; 20]) },
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["sequence"], 3);
        assert_eq!(value["kind"], "issuer_removed");
        assert_eq!(value["issuer"], format!("0x{}", "01".repeat(20)));
    }
}
