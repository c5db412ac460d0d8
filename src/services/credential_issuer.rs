// src/services/credential_issuer.rs
//! Credential Issuer Service
//!
//! Combines document storage with on-registry issuance. The document goes
//! to content-addressed storage first; the returned reference is then
//! recorded in a new credential.
//!
//! The upload is outside the registry's atomic boundary. A failed issuance
//! may leave an unreferenced document in storage, but never a credential
//! pointing at a missing document.

use crate::contracts::credential_registry::RegistryService;
use crate::contracts::error::RegistryError;
use crate::models::identity::{CredentialId, Identity};
use crate::services::ServiceError;
use crate::storage::ipfs_client::ContentStorage;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Outcome of a document issuance.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IssuedCredential {
    pub credential_id: CredentialId,
    pub content_ref: String,
}

/// Service for issuing and revoking credentials on behalf of issuers.
pub struct CredentialIssuer<S> {
    registry: RegistryService,
    storage: Arc<S>,
}

impl<S: ContentStorage> CredentialIssuer<S> {
    /// Creates a new CredentialIssuer instance
    ///
    /// # Arguments
    /// * `registry` - Registry the credentials are recorded in
    /// * `storage` - Backend holding the credential documents
    pub fn new(registry: RegistryService, storage: Arc<S>) -> Self {
        Self { registry, storage }
    }

    pub fn registry(&self) -> &RegistryService {
        &self.registry
    }

    /// Stores `document` and issues a credential referencing it.
    ///
    /// Authorization and pause state are checked before the upload so that
    /// a request that is bound to fail does not write to storage. The
    /// registry re-checks both when it issues.
    ///
    /// # Returns
    /// The new credential ID and the content reference it points to
    pub async fn issue_document(
        &self,
        caller: Identity,
        subject: Identity,
        document: &serde_json::Value,
        credential_type: &str,
        expiry: u64,
    ) -> Result<IssuedCredential, ServiceError> {
        if self.registry.is_paused() {
            return Err(RegistryError::SystemPaused.into());
        }
        if !self.registry.is_authorized_issuer(caller) {
            return Err(RegistryError::Unauthorized(format!("{} is not an authorized issuer", caller)).into());
        }

        let metadata = json!({
            "issuer": caller,
            "subject": subject,
            "credential_type": credential_type,
            "expiry_date": expiry,
        });
        let content_ref = self.storage.store_document(document, &metadata).await?;
        log::debug!("document for {} stored as {}", subject, content_ref);

        let credential_id = self.issue_credential(caller, subject, &content_ref, credential_type, expiry)?;
        Ok(IssuedCredential {
            credential_id,
            content_ref,
        })
    }

    /// Issues a credential for a document that is already stored.
    pub fn issue_credential(
        &self,
        caller: Identity,
        subject: Identity,
        content_ref: &str,
        credential_type: &str,
        expiry: u64,
    ) -> Result<CredentialId, ServiceError> {
        Ok(self
            .registry
            .issue_credential(caller, subject, content_ref, credential_type, expiry)?)
    }

    /// Revokes an existing credential
    pub fn revoke_credential(&self, caller: Identity, credential_id: CredentialId) -> Result<(), ServiceError> {
        Ok(self.registry.revoke_credential(caller, credential_id)?)
    }
}

impl<S> Clone for CredentialIssuer<S> {
    /// Creates a clone of the CredentialIssuer sharing registry and storage
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            storage: self.storage.clone(),
        }
    }
}
