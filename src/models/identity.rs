// src/models/identity.rs
//! Identity handles used throughout the registry.
//!
//! Two fixed-width identifiers live here:
//! - [`Identity`]: a 20-byte account handle for owners, issuers and subjects
//! - [`CredentialId`]: the 32-byte digest that names a credential record
//!
//! Both render as `0x`-prefixed lowercase hex and serialize as hex strings,
//! so the same text form is used in logs, HTTP payloads and audit exports.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a hex handle cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIdError {
    /// Input is not valid hexadecimal.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded byte length does not match the handle width.
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], ParseIdError> {
    let trimmed = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    let bytes = hex::decode(trimmed).map_err(|e| ParseIdError::InvalidHex(e.to_string()))?;
    let actual = bytes.len();
    bytes.try_into().map_err(|_| ParseIdError::InvalidLength {
        expected: N,
        actual,
    })
}

/// A 20-byte account handle supplied by the host's identity substrate.
///
/// The registry never authenticates identities itself; every handle that
/// arrives with a call is trusted as-is. [`Identity::ZERO`] is reserved and
/// rejected wherever a real participant is required.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Identity([u8; 20]);

impl Identity {
    /// Width of an identity in bytes.
    pub const LEN: usize = 20;

    /// The all-zero handle.
    pub const ZERO: Identity = Identity([0u8; 20]);

    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Identity(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl FromStr for Identity {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<20>(s).map(Identity)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self)
    }
}

/// Content-derived identifier of a credential record.
///
/// Produced by [`crate::utils::crypto::derive_credential_id`]; never chosen
/// by callers and never reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CredentialId([u8; 32]);

impl CredentialId {
    pub const LEN: usize = 32;

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        CredentialId(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for CredentialId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<32>(s).map(CredentialId)
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CredentialId({})", self)
    }
}

macro_rules! hex_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(de::Error::custom)
            }
        }
    };
}

hex_serde!(Identity);
hex_serde!(CredentialId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_parses_with_and_without_prefix() {
        let with: Identity = "0x00000000000000000000000000000000000000aB".parse().unwrap();
        let without: Identity = "00000000000000000000000000000000000000ab".parse().unwrap();
        assert_eq!(with, without);
        assert_eq!(with.to_string(), "0x00000000000000000000000000000000000000ab");
    }

    #[test]
    fn test_identity_rejects_wrong_length() {
        let err = "0x1234".parse::<Identity>().unwrap_err();
        assert_eq!(err, ParseIdError::InvalidLength { expected: 20, actual: 2 });
    }

    #[test]
    fn test_identity_rejects_non_hex() {
        assert!(matches!(
            "0xzz00000000000000000000000000000000000000".parse::<Identity>(),
            Err(ParseIdError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_zero_identity() {
        assert!(Identity::ZERO.is_zero());
        assert!(!Identity::from_bytes([1u8; 20]).is_zero());
        assert_eq!(Identity::default(), Identity::ZERO);
    }

    #[test]
    fn test_credential_id_json_is_hex_string() {
        let id = CredentialId::from_bytes([0xab; 32]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(32)));
        let back: CredentialId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
