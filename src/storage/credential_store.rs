// src/storage/credential_store.rs
//! Credential record table and its two append-only indices.
//!
//! Provides in-memory storage keyed by [`CredentialId`] with:
//! - O(1) average lookups by ID
//! - per-subject and per-issuer ID sequences in issuance order
//!
//! Records are never removed. The only in-place change is the one-way
//! revocation flag, so indices never need to be rewritten.

use crate::contracts::error::{RegistryError, RegistryResult};
use crate::models::credential::Credential;
use crate::models::identity::{CredentialId, Identity};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    records: HashMap<CredentialId, Credential>,
    by_subject: HashMap<Identity, Vec<CredentialId>>,
    by_issuer: HashMap<Identity, Vec<CredentialId>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new record and appends it to both indices.
    ///
    /// # Errors
    /// `AlreadyExists` if a record with the same ID is present; the existing
    /// record and the indices are left untouched.
    pub fn insert(&mut self, credential: Credential) -> RegistryResult<()> {
        if self.records.contains_key(&credential.id) {
            return Err(RegistryError::AlreadyExists(format!(
                "credential {} already exists",
                credential.id
            )));
        }
        self.by_subject.entry(credential.subject).or_default().push(credential.id);
        self.by_issuer.entry(credential.issuer).or_default().push(credential.id);
        self.records.insert(credential.id, credential);
        Ok(())
    }

    pub fn get(&self, id: &CredentialId) -> Option<&Credential> {
        self.records.get(id)
    }

    /// Flips the revocation flag of an existing, unrevoked record.
    ///
    /// # Errors
    /// - `NotFound` for an unknown ID
    /// - `AlreadyRevoked` if the flag is already set
    pub fn mark_revoked(&mut self, id: &CredentialId) -> RegistryResult<()> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(format!("credential {}", id)))?;
        if record.revoked {
            return Err(RegistryError::AlreadyRevoked(id.to_string()));
        }
        record.revoked = true;
        Ok(())
    }

    /// IDs issued to `subject`, oldest first.
    pub fn by_subject(&self, subject: &Identity) -> Vec<CredentialId> {
        self.by_subject.get(subject).cloned().unwrap_or_default()
    }

    /// IDs issued by `issuer`, oldest first.
    pub fn by_issuer(&self, issuer: &Identity) -> Vec<CredentialId> {
        self.by_issuer.get(issuer).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
