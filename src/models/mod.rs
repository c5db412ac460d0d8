// src/models/mod.rs
//! Data structures shared by the registry, storage and service layers.

pub mod credential;
pub mod event;
pub mod identity;
pub mod issuer;
