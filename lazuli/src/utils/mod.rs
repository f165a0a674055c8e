//! Utility Functions and Cross-Cutting Concerns
//!
//! - **serialization**: serde helpers for tolerant decoding of wire payloads

pub mod serialization;

pub use serialization::*;
