// src/config.rs
//! Runtime configuration.
//!
//! Sources, lowest priority first:
//! 1. built-in defaults
//! 2. optional `registry.toml` in the working directory
//! 3. `REGISTRY_*` environment variables (a `.env` file is loaded by `main`)
//!
//! ## Keys
//! - `owner` (required): hex identity of the registry owner
//! - `bind_addr`: API listen address, default `127.0.0.1:3000`
//! - `storage_backend`: `ipfs` (default) or `memory`
//! - `ipfs_api_url`: IPFS API endpoint, default `http://localhost:5001`
//! - `event_channel_capacity`: live event-feed buffer, default `1024`

use crate::models::identity::{Identity, ParseIdError};
use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_IPFS_API_URL: &str = "http://localhost:5001";
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: i64 = 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("invalid owner identity {0:?}: {1}")]
    InvalidOwner(String, String),

    #[error("invalid bind address {0:?}: {1}")]
    InvalidBindAddr(String, String),

    #[error("event_channel_capacity must be at least 1")]
    InvalidCapacity,
}

/// Where credential documents are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Ipfs,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub owner: String,
    pub bind_addr: String,
    pub storage_backend: StorageBackend,
    pub ipfs_api_url: String,
    pub event_channel_capacity: usize,
}

/// `REGISTRY_*` variables, kept as strings so that an all-digit owner is not
/// read as a number. Numeric keys are converted on deserialization.
fn environment() -> Environment {
    Environment::with_prefix("REGISTRY")
}

impl Settings {
    /// Loads settings from `registry.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("registry").required(false))
            .add_source(environment());
        Self::from_builder(builder)
    }

    /// Applies defaults to `builder`, then deserializes and validates.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder
            .set_default("bind_addr", DEFAULT_BIND_ADDR)?
            .set_default("storage_backend", "ipfs")?
            .set_default("ipfs_api_url", DEFAULT_IPFS_API_URL)?
            .set_default("event_channel_capacity", DEFAULT_EVENT_CHANNEL_CAPACITY)?
            .build()?
            .try_deserialize()?;
        settings.owner_identity()?;
        settings.socket_addr()?;
        if settings.event_channel_capacity == 0 {
            return Err(ConfigError::InvalidCapacity);
        }
        Ok(settings)
    }

    pub fn owner_identity(&self) -> Result<Identity, ConfigError> {
        let owner: Identity = self
            .owner
            .parse()
            .map_err(|e: ParseIdError| ConfigError::InvalidOwner(self.owner.clone(), e.to_string()))?;
        if owner.is_zero() {
            return Err(ConfigError::InvalidOwner(self.owner.clone(), "zero identity".into()));
        }
        Ok(owner)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidBindAddr(self.bind_addr.clone(), e.to_string()))
    }
}
