// src/lib.rs

//! # Credential Registry
//!
//! Lets authorized organizations issue tamper-evident credential records
//! and lets any third party check authenticity, revocation and issuer
//! standing without trusting the issuer directly.
//!
//! ## Architecture Overview
//! 1. **Contracts Layer**: the registry state machine ([`RegistryService`])
//!    with its access-control gate, issuer directory and event log
//! 2. **Storage Layer**: credential table and indices, plus external
//!    content-addressed document storage (IPFS)
//! 3. **Services Layer**: issuance and verification workflows, HTTP API
//!
//! ## Example
//! ```
//! use credential_registry::{Identity, RegistryService};
//!
//! let owner = Identity::from_bytes([0xaa; 20]);
//! let issuer = Identity::from_bytes([0x01; 20]);
//! let subject = Identity::from_bytes([0x02; 20]);
//!
//! let registry = RegistryService::new(owner).unwrap();
//! registry.add_issuer(owner, issuer, "Example University", "NL").unwrap();
//! let id = registry
//!     .issue_credential(issuer, subject, "bafybeigdyrzt", "degree", 0)
//!     .unwrap();
//! assert!(registry.verify_credential(id).unwrap().is_valid);
//! ```

pub mod config;
pub mod contracts;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use contracts::credential_registry::RegistryService;
pub use contracts::error::{RegistryError, RegistryResult};
pub use models::credential::{Credential, CredentialStatus, VerificationResult};
pub use models::event::{EventRecord, RegistryEvent};
pub use models::identity::{CredentialId, Identity};
pub use models::issuer::Issuer;
