// src/contracts/credential_registry.rs
//! Credential registry state machine.
//!
//! Orchestrates issuance, verification and revocation on top of the issuer
//! directory, the access-control gate, the credential store and the event log.
//!
//! # Atomicity
//! All state sits behind one `RwLock`. A mutating call holds the write lock
//! from its first check to its last effect, which serializes mutations into
//! a single total order. Every precondition is checked before the first
//! effect is applied, and the only fallible effect (the record insert) is
//! applied first, so a failed call commits nothing and emits no event.
//!
//! # Validity
//! `is_valid` is never stored. It is recomputed on each read as
//! `!revoked && !expired && issuer currently authorized`, so deactivating an
//! issuer invalidates its earlier credentials without touching their records.

use crate::contracts::access_control::AccessControl;
use crate::contracts::error::{RegistryError, RegistryResult};
use crate::contracts::event_log::{EventLog, DEFAULT_CHANNEL_CAPACITY};
use crate::contracts::issuer_directory::{check_text, IssuerDirectory};
use crate::models::credential::{Credential, CredentialStatus, VerificationResult};
use crate::models::event::{EventRecord, RegistryEvent};
use crate::models::identity::{CredentialId, Identity};
use crate::models::issuer::Issuer;
use crate::storage::credential_store::CredentialStore;
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::crypto::derive_credential_id;
use log::{debug, info, warn};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

pub const MAX_CONTENT_REF_LEN: usize = 256;
pub const MAX_CREDENTIAL_TYPE_LEN: usize = 64;

#[derive(Debug)]
struct RegistryState {
    access: AccessControl,
    issuers: IssuerDirectory,
    credentials: CredentialStore,
    events: EventLog,
}

/// Handle to a credential registry.
///
/// Cloning is cheap and every clone operates on the same registry.
#[derive(Clone)]
pub struct RegistryService {
    state: Arc<RwLock<RegistryState>>,
    clock: Arc<dyn Clock>,
}

impl RegistryService {
    /// Creates an empty registry administered by `owner`, on wall-clock time.
    pub fn new(owner: Identity) -> RegistryResult<Self> {
        Self::with_clock(owner, Arc::new(SystemClock))
    }

    pub fn with_clock(owner: Identity, clock: Arc<dyn Clock>) -> RegistryResult<Self> {
        Self::with_options(owner, clock, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a registry with an explicit clock and live event-feed capacity.
    ///
    /// # Errors
    /// `InvalidInput` if `owner` is the zero identity.
    pub fn with_options(owner: Identity, clock: Arc<dyn Clock>, event_capacity: usize) -> RegistryResult<Self> {
        let state = RegistryState {
            access: AccessControl::new(owner)?,
            issuers: IssuerDirectory::new(),
            credentials: CredentialStore::new(),
            events: EventLog::new(event_capacity),
        };
        info!("credential registry initialised with owner {}", owner);
        Ok(RegistryService {
            state: Arc::new(RwLock::new(state)),
            clock,
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // =====================
    // Administration
    // =====================

    /// Registers `id` as an active, authorized issuer. Owner only.
    ///
    /// # Errors
    /// `Unauthorized`, `InvalidInput`, `AlreadyExists`
    pub fn add_issuer(&self, caller: Identity, id: Identity, name: &str, country: &str) -> RegistryResult<Issuer> {
        let mut guard = self.write();
        let state = &mut *guard;
        let now = self.clock.now();
        let result = state
            .access
            .ensure_owner(&caller)
            .and_then(|_| state.issuers.register(id, name, country, now));
        let issuer = rejected("add_issuer", result)?;
        state.events.append(
            RegistryEvent::IssuerAdded {
                issuer: id,
                name: issuer.name.clone(),
                country: issuer.country.clone(),
            },
            now,
        );
        info!("issuer {} ({}) added", id, issuer.name);
        Ok(issuer)
    }

    /// Deactivates an issuer. Owner only. The directory entry and every
    /// credential it issued are kept; those credentials stop validating.
    ///
    /// # Errors
    /// `Unauthorized`, `NotFound`
    pub fn remove_issuer(&self, caller: Identity, id: Identity) -> RegistryResult<()> {
        let mut guard = self.write();
        let state = &mut *guard;
        let now = self.clock.now();
        let result = state
            .access
            .ensure_owner(&caller)
            .and_then(|_| state.issuers.deactivate(&id));
        rejected("remove_issuer", result)?;
        state.events.append(RegistryEvent::IssuerRemoved { issuer: id }, now);
        info!("issuer {} removed", id);
        Ok(())
    }

    /// Suspends issuance and revocation. Verification stays available.
    pub fn pause(&self, caller: Identity) -> RegistryResult<()> {
        let mut guard = self.write();
        let state = &mut *guard;
        let now = self.clock.now();
        rejected("pause", state.access.pause(&caller))?;
        state.events.append(RegistryEvent::Paused { by: caller }, now);
        warn!("registry paused by {}", caller);
        Ok(())
    }

    pub fn unpause(&self, caller: Identity) -> RegistryResult<()> {
        let mut guard = self.write();
        let state = &mut *guard;
        let now = self.clock.now();
        rejected("unpause", state.access.unpause(&caller))?;
        state.events.append(RegistryEvent::Unpaused { by: caller }, now);
        info!("registry unpaused by {}", caller);
        Ok(())
    }

    pub fn transfer_ownership(&self, caller: Identity, new_owner: Identity) -> RegistryResult<()> {
        let mut guard = self.write();
        let state = &mut *guard;
        let now = self.clock.now();
        let previous_owner = rejected("transfer_ownership", state.access.transfer_ownership(&caller, new_owner))?;
        state.events.append(
            RegistryEvent::OwnershipTransferred {
                previous_owner,
                new_owner,
            },
            now,
        );
        info!("ownership transferred from {} to {}", previous_owner, new_owner);
        Ok(())
    }

    pub fn owner(&self) -> Identity {
        self.read().access.owner()
    }

    pub fn is_paused(&self) -> bool {
        self.read().access.is_paused()
    }

    // =====================
    // Issuer queries
    // =====================

    pub fn get_issuer(&self, id: Identity) -> RegistryResult<Issuer> {
        self.read()
            .issuers
            .get(&id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(format!("issuer {}", id)))
    }

    pub fn is_authorized_issuer(&self, id: Identity) -> bool {
        self.read().issuers.is_authorized(&id)
    }

    pub fn list_issuers(&self) -> Vec<Issuer> {
        self.read().issuers.list()
    }

    // =====================
    // Credential lifecycle
    // =====================

    /// Creates a credential record for `subject` on behalf of `caller`.
    ///
    /// The ID is derived from `(caller, subject, content_ref, credential_type,
    /// now)`. An `expiry` of `0` means the credential never expires; an expiry
    /// already in the past is accepted and simply never validates.
    ///
    /// # Errors
    /// - `SystemPaused` while the registry is paused
    /// - `Unauthorized` if `caller` is not an active issuer
    /// - `InvalidInput` for a zero subject or an empty/oversize reference or type
    /// - `AlreadyExists` if the derived ID is already taken
    pub fn issue_credential(
        &self,
        caller: Identity,
        subject: Identity,
        content_ref: &str,
        credential_type: &str,
        expiry: u64,
    ) -> RegistryResult<CredentialId> {
        let mut guard = self.write();
        let state = &mut *guard;
        let now = self.clock.now();
        let result = check_issuance(state, &caller, &subject, content_ref, credential_type).and_then(|_| {
            let credential = Credential {
                id: derive_credential_id(&caller, &subject, content_ref, credential_type, now),
                content_ref: content_ref.to_string(),
                issuer: caller,
                subject,
                credential_type: credential_type.to_string(),
                issue_date: now,
                expiry_date: expiry,
                revoked: false,
            };
            let id = credential.id;
            state.credentials.insert(credential).map(|_| id)
        });
        let id = rejected("issue_credential", result)?;

        state.issuers.record_issuance(&caller);
        state.events.append(
            RegistryEvent::CredentialIssued {
                credential_id: id,
                issuer: caller,
                subject,
                credential_type: credential_type.to_string(),
                content_ref: content_ref.to_string(),
                expiry_date: expiry,
            },
            now,
        );
        info!("credential {} issued by {} to {}", id, caller, subject);
        Ok(id)
    }

    /// Looks up a credential and recomputes its validity.
    ///
    /// Callable while paused.
    ///
    /// # Errors
    /// `NotFound` for an unknown ID.
    pub fn verify_credential(&self, id: CredentialId) -> RegistryResult<VerificationResult> {
        self.verify_with_status(id).map(|(result, _)| result)
    }

    /// Verification result and status reason, read from one snapshot.
    pub fn verify_with_status(&self, id: CredentialId) -> RegistryResult<(VerificationResult, CredentialStatus)> {
        let state = self.read();
        let (credential, status) = self.evaluate(&state, &id)?;
        debug!("credential {} verified: {:?}", id, status);
        let result = VerificationResult {
            is_valid: status.is_valid(),
            issuer: credential.issuer,
            subject: credential.subject,
            credential_type: credential.credential_type.clone(),
            issue_date: credential.issue_date,
            expiry_date: credential.expiry_date,
            is_revoked: credential.revoked,
        };
        Ok((result, status))
    }

    /// The reason behind a credential's current validity.
    pub fn credential_status(&self, id: CredentialId) -> RegistryResult<CredentialStatus> {
        let state = self.read();
        self.evaluate(&state, &id).map(|(_, status)| status)
    }

    /// Copy of the stored record.
    pub fn get_credential(&self, id: CredentialId) -> RegistryResult<Credential> {
        self.read()
            .credentials
            .get(&id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(format!("credential {}", id)))
    }

    /// Permanently revokes a credential. There is no way back.
    ///
    /// The recorded issuer may revoke its own credentials even after it has
    /// been deactivated; the owner may revoke any credential.
    ///
    /// # Errors
    /// `SystemPaused`, `NotFound`, `Unauthorized`, `AlreadyRevoked`
    pub fn revoke_credential(&self, caller: Identity, id: CredentialId) -> RegistryResult<()> {
        let mut guard = self.write();
        let state = &mut *guard;
        let now = self.clock.now();
        let result = check_revocation(state, &caller, &id).and_then(|issuer| {
            state.credentials.mark_revoked(&id)?;
            Ok(issuer)
        });
        let issuer = rejected("revoke_credential", result)?;

        state.events.append(
            RegistryEvent::CredentialRevoked {
                credential_id: id,
                issuer,
                revoked_by: caller,
            },
            now,
        );
        info!("credential {} revoked by {}", id, caller);
        Ok(())
    }

    /// IDs issued to `subject`, in issuance order. Revoked and expired
    /// entries are included; callers re-verify each one.
    pub fn list_by_subject(&self, subject: Identity) -> Vec<CredentialId> {
        self.read().credentials.by_subject(&subject)
    }

    /// IDs issued by `issuer`, in issuance order.
    pub fn list_by_issuer(&self, issuer: Identity) -> Vec<CredentialId> {
        self.read().credentials.by_issuer(&issuer)
    }

    pub fn total_credentials(&self) -> u64 {
        self.read().credentials.len() as u64
    }

    // =====================
    // Event feed
    // =====================

    /// Committed events with `sequence >= from`.
    pub fn events_since(&self, from: u64) -> Vec<EventRecord> {
        self.read().events.since(from)
    }

    /// Live feed of events committed after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.read().events.subscribe()
    }

    fn evaluate<'s>(
        &self,
        state: &'s RegistryState,
        id: &CredentialId,
    ) -> RegistryResult<(&'s Credential, CredentialStatus)> {
        let credential = state
            .credentials
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(format!("credential {}", id)))?;
        let status = CredentialStatus::evaluate(
            credential,
            self.clock.now(),
            state.issuers.is_authorized(&credential.issuer),
        );
        Ok((credential, status))
    }
}

fn check_issuance(
    state: &RegistryState,
    caller: &Identity,
    subject: &Identity,
    content_ref: &str,
    credential_type: &str,
) -> RegistryResult<()> {
    state.access.ensure_not_paused()?;
    state.issuers.ensure_authorized(caller)?;
    if subject.is_zero() {
        return Err(RegistryError::InvalidInput("subject must not be the zero identity".into()));
    }
    check_text("content reference", content_ref, MAX_CONTENT_REF_LEN)?;
    check_text("credential type", credential_type, MAX_CREDENTIAL_TYPE_LEN)?;
    Ok(())
}

/// Returns the recorded issuer of the credential when `caller` may revoke it.
fn check_revocation(state: &RegistryState, caller: &Identity, id: &CredentialId) -> RegistryResult<Identity> {
    state.access.ensure_not_paused()?;
    let credential = state
        .credentials
        .get(id)
        .ok_or_else(|| RegistryError::NotFound(format!("credential {}", id)))?;
    if credential.issuer != *caller && !state.access.is_owner(caller) {
        return Err(RegistryError::Unauthorized(format!(
            "{} may not revoke credential {}",
            caller, id
        )));
    }
    if credential.revoked {
        return Err(RegistryError::AlreadyRevoked(id.to_string()));
    }
    Ok(credential.issuer)
}

fn rejected<T>(operation: &str, result: RegistryResult<T>) -> RegistryResult<T> {
    if let Err(e) = &result {
        warn!("{} rejected: {}", operation, e);
    }
    result
}
