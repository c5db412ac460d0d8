// src/contracts/mod.rs
//! The credential registry state machine and its components.

pub mod access_control;
pub mod credential_registry;
pub mod error;
pub mod event_log;
pub mod issuer_directory;
