// src/storage/mod.rs
//! Storage layer: the credential table with its indices, and the external
//! content-addressed document store.

pub mod credential_store;
pub mod ipfs_client;
