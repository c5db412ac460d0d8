// src/utils/mod.rs
//! Helper functions.

pub mod clock;
pub mod crypto;
pub mod serialization;
