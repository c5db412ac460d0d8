// src/models/issuer.rs
//! Issuer data model.
//!
//! An issuer is an organization the registry owner has authorized to create
//! credential records. Issuers are soft-deactivated rather than removed, so
//! the directory keeps the audit trail of everything they ever issued.

use crate::models::identity::Identity;
use serde::{Deserialize, Serialize};

/// Directory entry for an authorized (or formerly authorized) issuer.
///
/// # Fields
/// - `id`: identity handle the issuer signs calls with
/// - `name`: human-readable display name
/// - `country`: jurisdiction the issuer operates from
/// - `active`: `false` once the owner has deactivated the issuer
/// - `registered_at`: registration time, seconds since the Unix epoch
/// - `issued_count`: number of credentials created by this issuer
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Issuer {
    pub id: Identity,
    pub name: String,
    pub country: String,
    pub active: bool,
    pub registered_at: u64,
    pub issued_count: u64,
}

impl Issuer {
    pub fn new(id: Identity, name: String, country: String, registered_at: u64) -> Self {
        Issuer {
            id,
            name,
            country,
            active: true,
            registered_at,
            issued_count: 0,
        }
    }
}
