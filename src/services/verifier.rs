// src/services/verifier.rs
//! Credential verification service.
//!
//! Everything a third-party verifier needs: the live verification result,
//! the reason behind it, and the stored document the credential points to.
//! None of these calls are affected by the pause switch.

use crate::contracts::credential_registry::RegistryService;
use crate::models::credential::{CredentialStatus, VerificationResult};
use crate::models::identity::{CredentialId, Identity};
use crate::services::ServiceError;
use crate::storage::ipfs_client::ContentStorage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Verification result together with the ID and status reason.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub credential_id: CredentialId,
    pub status: CredentialStatus,
    #[serde(flatten)]
    pub result: VerificationResult,
}

pub struct Verifier<S> {
    registry: RegistryService,
    storage: Arc<S>,
}

impl<S: ContentStorage> Verifier<S> {
    pub fn new(registry: RegistryService, storage: Arc<S>) -> Self {
        Self { registry, storage }
    }

    /// Verifies a credential against the registry.
    ///
    /// # Returns
    /// - `Ok(result)` with `is_valid` recomputed at call time
    /// - `Err` if the credential does not exist
    pub fn verify_credential(&self, credential_id: CredentialId) -> Result<VerificationResult, ServiceError> {
        Ok(self.registry.verify_credential(credential_id)?)
    }

    pub fn report(&self, credential_id: CredentialId) -> Result<VerificationReport, ServiceError> {
        let (result, status) = self.registry.verify_with_status(credential_id)?;
        Ok(VerificationReport {
            credential_id,
            status,
            result,
        })
    }

    /// Re-verifies every credential ever issued to `subject`, oldest first.
    pub fn verify_subject(&self, subject: Identity) -> Result<Vec<VerificationReport>, ServiceError> {
        self.registry
            .list_by_subject(subject)
            .into_iter()
            .map(|id| self.report(id))
            .collect()
    }

    /// Retrieves the stored document envelope a credential points to.
    pub async fn fetch_document(&self, credential_id: CredentialId) -> Result<serde_json::Value, ServiceError> {
        let credential = self.registry.get_credential(credential_id)?;
        let bytes = self.storage.retrieve_data(&credential.content_ref).await?;
        let envelope = serde_json::from_slice(&bytes).map_err(crate::storage::ipfs_client::StorageError::from)?;
        Ok(envelope)
    }
}

impl<S> Clone for Verifier<S> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            storage: self.storage.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::credential_issuer::CredentialIssuer;
    use crate::storage::ipfs_client::InMemoryStorage;
    use crate::utils::clock::ManualClock;
    use serde_json::json;

    const OWNER: Identity = Identity::from_bytes([0xaa; 20]);
    const ISSUER: Identity = Identity::from_bytes([0x01; 20]);
    const SUBJECT: Identity = Identity::from_bytes([0x02; 20]);

    #[tokio::test]
    async fn test_report_and_document() {
        let clock = ManualClock::new(10);
        let registry = RegistryService::with_clock(OWNER, Arc::new(clock.clone())).unwrap();
        registry.add_issuer(OWNER, ISSUER, "Guild", "PT").unwrap();
        let storage = Arc::new(InMemoryStorage::new());
        let issuer = CredentialIssuer::new(registry.clone(), storage.clone());
        let verifier = Verifier::new(registry.clone(), storage);

        let first = issuer
            .issue_document(ISSUER, SUBJECT, &json!({"level": 1}), "membership", 0)
            .await
            .unwrap();
        clock.advance(1);
        let second = issuer
            .issue_document(ISSUER, SUBJECT, &json!({"level": 2}), "membership", 0)
            .await
            .unwrap();
        registry.revoke_credential(ISSUER, first.credential_id).unwrap();

        let reports = verifier.verify_subject(SUBJECT).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].status, CredentialStatus::Revoked);
        assert!(reports[1].result.is_valid);

        let envelope = verifier.fetch_document(second.credential_id).await.unwrap();
        assert_eq!(envelope["document"]["level"], 2);
    }

    #[test]
    fn test_unknown_credential() {
        let registry = RegistryService::new(OWNER).unwrap();
        let verifier = Verifier::new(registry, Arc::new(InMemoryStorage::new()));
        assert!(verifier.verify_credential(CredentialId::from_bytes([0; 32])).is_err());
    }
}
