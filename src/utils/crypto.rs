// src/utils/crypto.rs
//! Hashing utilities for content-addressed credential identifiers.
//!
//! Uses SHA-256 (via `ring`) for all operations.

use crate::models::identity::{CredentialId, Identity};
use ring::digest::{digest, SHA256};

/// Domain tag prefixed to every credential ID preimage.
pub const CREDENTIAL_ID_DOMAIN: &[u8] = b"credential-registry/v1";

/// Computes a SHA-256 hash of the input data.
///
/// # Arguments
/// * `data` - Binary data to hash (as bytes slice)
///
/// # Returns
/// Fixed-size 32-byte array (`[u8; 32]`) containing the hash.
pub fn hash_data(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(digest(&SHA256, data).as_ref());
    out
}

/// Builds the exact byte sequence hashed into a credential ID.
///
/// # Layout
/// All integers are big-endian; strings are UTF-8 with a `u32` length prefix.
/// ```text
/// domain || issuer[20] || subject[20]
///        || len(content_ref) || content_ref
///        || len(credential_type) || credential_type
///        || issued_at: u64
/// ```
/// Auditors reproducing an ID must serialize exactly this way.
pub fn credential_id_preimage(
    issuer: &Identity,
    subject: &Identity,
    content_ref: &str,
    credential_type: &str,
    issued_at: u64,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(
        CREDENTIAL_ID_DOMAIN.len() + 2 * Identity::LEN + 8 + content_ref.len() + credential_type.len() + 8,
    );
    buf.extend_from_slice(CREDENTIAL_ID_DOMAIN);
    buf.extend_from_slice(issuer.as_bytes());
    buf.extend_from_slice(subject.as_bytes());
    push_str(&mut buf, content_ref);
    push_str(&mut buf, credential_type);
    buf.extend_from_slice(&issued_at.to_be_bytes());
    buf
}

fn push_str(buf: &mut Vec<u8>, s: &str) {
    // Field sizes are bounded by registry input validation, far below u32::MAX.
    buf.extend_from_slice(&(s.len() as u32).to_be_bytes());
    buf.extend_from_slice(s.as_bytes());
}

/// Derives the deterministic ID of a credential from its issuance tuple.
///
/// Identical inputs and timestamp always give the same ID, which lets an
/// auditor re-derive it; any change to any field gives an unrelated one.
pub fn derive_credential_id(
    issuer: &Identity,
    subject: &Identity,
    content_ref: &str,
    credential_type: &str,
    issued_at: u64,
) -> CredentialId {
    let preimage = credential_id_preimage(issuer, subject, content_ref, credential_type, issued_at);
    CredentialId::from_bytes(hash_data(&preimage))
}
