// src/services/mod.rs
//! Business workflows around the registry, and the HTTP API.

pub mod api_server;
pub mod credential_issuer;
pub mod verifier;

use crate::contracts::error::RegistryError;
use crate::storage::ipfs_client::StorageError;
use thiserror::Error;

/// Error of a service-level workflow.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
