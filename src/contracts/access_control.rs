// src/contracts/access_control.rs
//! Single-owner capability gate and the global pause switch.
//!
//! Administrative operations call [`AccessControl::ensure_owner`] at entry;
//! issuance and revocation call [`AccessControl::ensure_not_paused`].
//! Verification never consults this gate, so pausing the registry during an
//! incident does not blind third-party checks.

use crate::contracts::error::{RegistryError, RegistryResult};
use crate::models::identity::Identity;

#[derive(Debug, Clone)]
pub struct AccessControl {
    owner: Identity,
    paused: bool,
}

impl AccessControl {
    /// Creates the gate with `owner` as the sole administrative identity.
    ///
    /// # Errors
    /// `InvalidInput` if `owner` is the zero identity.
    pub fn new(owner: Identity) -> RegistryResult<Self> {
        if owner.is_zero() {
            return Err(RegistryError::InvalidInput("owner must not be the zero identity".into()));
        }
        Ok(AccessControl { owner, paused: false })
    }

    pub fn owner(&self) -> Identity {
        self.owner
    }

    pub fn is_owner(&self, caller: &Identity) -> bool {
        *caller == self.owner
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn ensure_owner(&self, caller: &Identity) -> RegistryResult<()> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(RegistryError::Unauthorized(format!("{} is not the registry owner", caller)))
        }
    }

    pub fn ensure_not_paused(&self) -> RegistryResult<()> {
        if self.paused {
            Err(RegistryError::SystemPaused)
        } else {
            Ok(())
        }
    }

    /// Engages the pause switch. Owner only; fails if already paused.
    pub fn pause(&mut self, caller: &Identity) -> RegistryResult<()> {
        self.ensure_owner(caller)?;
        if self.paused {
            return Err(RegistryError::InvalidInput("registry is already paused".into()));
        }
        self.paused = true;
        Ok(())
    }

    /// Releases the pause switch. Owner only; fails if not paused.
    pub fn unpause(&mut self, caller: &Identity) -> RegistryResult<()> {
        self.ensure_owner(caller)?;
        if !self.paused {
            return Err(RegistryError::InvalidInput("registry is not paused".into()));
        }
        self.paused = false;
        Ok(())
    }

    /// Hands the owner capability to `new_owner` and returns the previous owner.
    pub fn transfer_ownership(&mut self, caller: &Identity, new_owner: Identity) -> RegistryResult<Identity> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(RegistryError::InvalidInput("new owner must not be the zero identity".into()));
        }
        let previous = self.owner;
        self.owner = new_owner;
        Ok(previous)
    }
}
