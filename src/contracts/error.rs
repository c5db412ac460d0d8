// src/contracts/error.rs
//! Failure kinds of the registry state machine.
//!
//! All failures are synchronous and deterministic; none of them is
//! retryable. A failed call never leaves partial state behind.

use thiserror::Error;

/// Error returned by every fallible registry operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Caller lacks the capability the operation requires.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Referenced issuer or credential does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Issuer already registered, or derived credential ID already taken.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Empty, oversize or otherwise malformed argument.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Issuance and revocation are suspended.
    #[error("system is paused")]
    SystemPaused,

    /// Credential was revoked earlier; revocation is one-way.
    #[error("credential already revoked: {0}")]
    AlreadyRevoked(String),
}

impl RegistryError {
    /// Stable machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            RegistryError::Unauthorized(_) => "unauthorized",
            RegistryError::NotFound(_) => "not_found",
            RegistryError::AlreadyExists(_) => "already_exists",
            RegistryError::InvalidInput(_) => "invalid_input",
            RegistryError::SystemPaused => "system_paused",
            RegistryError::AlreadyRevoked(_) => "already_revoked",
        }
    }
}

/// Convenience alias used throughout the registry.
pub type RegistryResult<T> = Result<T, RegistryError>;
