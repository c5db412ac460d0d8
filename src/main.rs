// src/main.rs

//! # Credential Registry - Main Entry Point
//!
//! Initializes the registry and starts the API server.
//!
//! ## Environment Variables
//! - `REGISTRY_OWNER`: identity of the registry owner (required)
//! - `REGISTRY_BIND_ADDR`: (Optional) listen address (default: 127.0.0.1:3000)
//! - `REGISTRY_STORAGE_BACKEND`: (Optional) `ipfs` or `memory` (default: ipfs)
//! - `REGISTRY_IPFS_API_URL`: (Optional) IPFS node URL (default: http://localhost:5001)
//! - `RUST_LOG`: (Optional) log filter (default: info)

use credential_registry::config::{Settings, StorageBackend};
use credential_registry::services::api_server::ApiServer;
use credential_registry::storage::ipfs_client::{InMemoryStorage, IpfsStorage};
use credential_registry::utils::clock::SystemClock;
use credential_registry::{EventRecord, RegistryService};
use dotenv::dotenv;
use std::sync::Arc;
use tokio::sync::broadcast::{error::RecvError, Receiver};

/// Main application entry point
///
/// # Initialization Sequence
/// 1. Load environment configuration
/// 2. Create the registry
/// 3. Connect the document storage backend
/// 4. Start API server
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load()?;
    let owner = settings.owner_identity()?;
    let addr = settings.socket_addr()?;

    let registry = RegistryService::with_options(owner, Arc::new(SystemClock), settings.event_channel_capacity)?;
    tokio::spawn(log_events(registry.subscribe()));

    match settings.storage_backend {
        StorageBackend::Ipfs => {
            log::info!("storing documents on ipfs at {}", settings.ipfs_api_url);
            let storage = IpfsStorage::with_url(&settings.ipfs_api_url)?;
            ApiServer::new(registry, Arc::new(storage)).run(addr).await?;
        }
        StorageBackend::Memory => {
            log::warn!("storing documents in memory; they are lost on exit");
            ApiServer::new(registry, Arc::new(InMemoryStorage::new())).run(addr).await?;
        }
    }
    Ok(())
}

/// Mirrors the committed event feed into the log.
async fn log_events(mut events: Receiver<EventRecord>) {
    loop {
        match events.recv().await {
            Ok(record) => log::info!(
                "event #{} {}: {}",
                record.sequence,
                record.event.kind(),
                serde_json::to_string(&record.event).unwrap_or_default()
            ),
            Err(RecvError::Lagged(skipped)) => log::warn!("event feed lagged, {} events skipped", skipped),
            Err(RecvError::Closed) => break,
        }
    }
}
