// src/contracts/issuer_directory.rs
//! Authoritative table of issuer identities.
//!
//! Entries are never physically removed. Deactivation clears the `active`
//! flag, which is also the issuer's authorization, so credentials issued
//! earlier stay attributable while no longer validating.

use crate::contracts::error::{RegistryError, RegistryResult};
use crate::models::identity::Identity;
use crate::models::issuer::Issuer;
use std::collections::HashMap;

pub const MAX_NAME_LEN: usize = 128;
pub const MAX_COUNTRY_LEN: usize = 64;

#[derive(Debug, Clone, Default)]
pub struct IssuerDirectory {
    issuers: HashMap<Identity, Issuer>,
    /// Registration order, for listing.
    order: Vec<Identity>,
}

impl IssuerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new active issuer.
    ///
    /// # Errors
    /// - `InvalidInput` on the zero identity, an empty or oversize name or country
    /// - `AlreadyExists` if `id` was ever registered, including deactivated issuers
    pub fn register(&mut self, id: Identity, name: &str, country: &str, now: u64) -> RegistryResult<Issuer> {
        if id.is_zero() {
            return Err(RegistryError::InvalidInput("issuer identity must not be zero".into()));
        }
        check_text("issuer name", name, MAX_NAME_LEN)?;
        check_text("issuer country", country, MAX_COUNTRY_LEN)?;
        if self.issuers.contains_key(&id) {
            return Err(RegistryError::AlreadyExists(format!("issuer {} is already registered", id)));
        }

        let issuer = Issuer::new(id, name.to_string(), country.to_string(), now);
        self.issuers.insert(id, issuer.clone());
        self.order.push(id);
        Ok(issuer)
    }

    /// Soft-deletes an issuer.
    ///
    /// # Errors
    /// `NotFound` if `id` is unknown or already deactivated.
    pub fn deactivate(&mut self, id: &Identity) -> RegistryResult<()> {
        match self.issuers.get_mut(id) {
            Some(issuer) if issuer.active => {
                issuer.active = false;
                Ok(())
            }
            _ => Err(RegistryError::NotFound(format!("no active issuer {}", id))),
        }
    }

    pub fn get(&self, id: &Identity) -> Option<&Issuer> {
        self.issuers.get(id)
    }

    pub fn is_authorized(&self, id: &Identity) -> bool {
        self.issuers.get(id).map(|i| i.active).unwrap_or(false)
    }

    pub fn ensure_authorized(&self, id: &Identity) -> RegistryResult<()> {
        if self.is_authorized(id) {
            Ok(())
        } else {
            Err(RegistryError::Unauthorized(format!("{} is not an authorized issuer", id)))
        }
    }

    /// Bumps the issued-count of an issuer. Callers have already checked
    /// that the issuer exists.
    pub fn record_issuance(&mut self, id: &Identity) {
        if let Some(issuer) = self.issuers.get_mut(id) {
            issuer.issued_count = issuer.issued_count.saturating_add(1);
        }
    }

    /// All issuers in registration order, deactivated ones included.
    pub fn list(&self) -> Vec<Issuer> {
        self.order
            .iter()
            .filter_map(|id| self.issuers.get(id))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Rejects empty or oversize text fields.
pub(crate) fn check_text(field: &str, value: &str, max: usize) -> RegistryResult<()> {
    if value.trim().is_empty() {
        return Err(RegistryError::InvalidInput(format!("{} must not be empty", field)));
    }
    if value.len() > max {
        return Err(RegistryError::InvalidInput(format!(
            "{} exceeds {} bytes",
            field, max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(b: u8) -> Identity {
        Identity::from_bytes([b; 20])
    }

    #[test]
    fn test_register_and_lookup() {
        let mut dir = IssuerDirectory::new();
        let issuer = dir.register(id(1), "Example University", "NL", 42).unwrap();
        assert!(issuer.active);
        assert_eq!(issuer.registered_at, 42);
        assert_eq!(issuer.issued_count, 0);
        assert!(dir.is_authorized(&id(1)));
        assert!(!dir.is_authorized(&id(2)));
    }

    #[test]
    fn test_register_validates_input() {
        let mut dir = IssuerDirectory::new();
        assert!(matches!(dir.register(Identity::ZERO, "a", "b", 0), Err(RegistryError::InvalidInput(_))));
        assert!(matches!(dir.register(id(1), "", "NL", 0), Err(RegistryError::InvalidInput(_))));
        assert!(matches!(dir.register(id(1), "   ", "NL", 0), Err(RegistryError::InvalidInput(_))));
        assert!(matches!(dir.register(id(1), "Uni", "", 0), Err(RegistryError::InvalidInput(_))));
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(dir.register(id(1), &long, "NL", 0), Err(RegistryError::InvalidInput(_))));
        assert!(dir.is_empty());
    }

    #[test]
    fn test_duplicate_registration_fails_even_after_deactivation() {
        let mut dir = IssuerDirectory::new();
        dir.register(id(1), "Uni", "NL", 0).unwrap();
        assert!(matches!(dir.register(id(1), "Uni", "NL", 1), Err(RegistryError::AlreadyExists(_))));
        dir.deactivate(&id(1)).unwrap();
        assert!(matches!(dir.register(id(1), "Uni", "NL", 2), Err(RegistryError::AlreadyExists(_))));
    }

    #[test]
    fn test_deactivate_is_soft() {
        let mut dir = IssuerDirectory::new();
        dir.register(id(1), "Uni", "NL", 0).unwrap();
        dir.record_issuance(&id(1));
        dir.deactivate(&id(1)).unwrap();

        let issuer = dir.get(&id(1)).unwrap();
        assert!(!issuer.active);
        assert_eq!(issuer.issued_count, 1);
        assert!(!dir.is_authorized(&id(1)));
        assert!(matches!(dir.deactivate(&id(1)), Err(RegistryError::NotFound(_))));
        assert!(matches!(dir.deactivate(&id(9)), Err(RegistryError::NotFound(_))));
    }

    #[test]
    fn test_list_keeps_registration_order() {
        let mut dir = IssuerDirectory::new();
        for b in [3, 1, 2] {
            dir.register(id(b), "Org", "DE", b as u64).unwrap();
        }
        let ids: Vec<_> = dir.list().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![id(3), id(1), id(2)]);
    }
}
