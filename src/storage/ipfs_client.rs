// src/storage/ipfs_client.rs
//! Content-addressed document storage.
//!
//! The registry never holds credential documents. They are handed to a
//! [`ContentStorage`] backend, which returns a stable opaque reference that
//! is then recorded in the credential. Two backends are provided:
//! - [`IpfsStorage`]: an IPFS node over its HTTP API
//! - [`InMemoryStorage`]: a process-local map, for tests and demos
//!
//! # Security Considerations
//! - Data on public IPFS is world-readable; encrypt before storage if needed
//! - References are content hashes and therefore permanent

use crate::utils::crypto::hash_data;
use crate::utils::serialization::document_envelope;
use bytes::BytesMut;
use futures::TryStreamExt;
use ipfs_api_backend_hyper::{IpfsApi, IpfsClient, TryFromUri};
use std::collections::HashMap;
use std::future::Future;
use std::io::Cursor;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::task;

/// Failure of a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Document could not be encoded.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend rejected or failed the request.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// No content under the given reference.
    #[error("content not found: {0}")]
    NotFound(String),

    /// Backend endpoint could not be parsed.
    #[error("invalid storage endpoint: {0}")]
    InvalidEndpoint(String),
}

/// External content-addressed store for credential documents.
pub trait ContentStorage: Send + Sync + 'static {
    /// Stores raw bytes and returns their content reference.
    fn store_data(&self, data: Vec<u8>) -> impl Future<Output = Result<String, StorageError>> + Send;

    /// Fetches raw bytes by content reference.
    fn retrieve_data(&self, content_ref: &str) -> impl Future<Output = Result<Vec<u8>, StorageError>> + Send;

    /// Stores a document together with its metadata and returns the
    /// reference of the combined envelope.
    fn store_document(
        &self,
        document: &serde_json::Value,
        metadata: &serde_json::Value,
    ) -> impl Future<Output = Result<String, StorageError>> + Send {
        let envelope = document_envelope(document, metadata);
        async move { self.store_data(envelope?).await }
    }
}

/// IPFS client wrapper.
///
/// Uses `ipfs-api-backend-hyper` under the hood. Its request futures are not
/// `Send`, so each call runs on a blocking worker with its own runtime.
#[derive(Clone)]
pub struct IpfsStorage {
    /// Shared IPFS client instance (thread-safe via Arc)
    client: Arc<IpfsClient>,
}

impl IpfsStorage {
    /// Creates a client for the local IPFS node at `http://localhost:5001`.
    pub fn new() -> Self {
        IpfsStorage {
            client: Arc::new(IpfsClient::default()),
        }
    }

    /// Creates a client for the IPFS API at `url`, e.g. `http://10.0.0.5:5001`.
    pub fn with_url(url: &str) -> Result<Self, StorageError> {
        let client = <IpfsClient as TryFromUri>::from_str(url)
            .map_err(|e| StorageError::InvalidEndpoint(format!("{}: {}", url, e)))?;
        Ok(IpfsStorage {
            client: Arc::new(client),
        })
    }

    async fn run_blocking<T, F, Fut>(&self, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(Arc<IpfsClient>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, StorageError>>,
    {
        let client = self.client.clone();
        task::spawn_blocking(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| StorageError::Backend(e.to_string()))?;
            rt.block_on(op(client))
        })
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?
    }
}

impl Default for IpfsStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStorage for IpfsStorage {
    fn store_data(&self, data: Vec<u8>) -> impl Future<Output = Result<String, StorageError>> + Send {
        let len = data.len();
        async move {
            let hash = self
                .run_blocking(move |client| async move {
                    client
                        .add(Cursor::new(data))
                        .await
                        .map(|res| res.hash)
                        .map_err(|e| StorageError::Backend(e.to_string()))
                })
                .await?;
            log::debug!("stored {} bytes on ipfs as {}", len, hash);
            Ok(hash)
        }
    }

    fn retrieve_data(&self, content_ref: &str) -> impl Future<Output = Result<Vec<u8>, StorageError>> + Send {
        let hash = content_ref.to_string();
        async move {
            self.run_blocking(move |client| async move {
                client
                    .cat(&hash)
                    .try_fold(BytesMut::new(), |mut acc, chunk| async move {
                        acc.extend_from_slice(&chunk);
                        Ok(acc)
                    })
                    .await
                    .map(|data| data.to_vec())
                    .map_err(|e| StorageError::Backend(e.to_string()))
            })
            .await
        }
    }
}

/// Process-local content storage keyed by the SHA-256 of the content.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ContentStorage for InMemoryStorage {
    fn store_data(&self, data: Vec<u8>) -> impl Future<Output = Result<String, StorageError>> + Send {
        let reference = format!("sha256-{}", hex::encode(hash_data(&data)));
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(reference.clone(), data);
        async move { Ok(reference) }
    }

    fn retrieve_data(&self, content_ref: &str) -> impl Future<Output = Result<Vec<u8>, StorageError>> + Send {
        let found = self
            .blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(content_ref)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(content_ref.to_string()));
        async move { found }
    }
}
