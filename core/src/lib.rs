//! # SMP Core
//!
//! Contract layer for the SMP data access stack. This crate defines the
//! session traits the operational layer is generic over, the error taxonomy
//! surfaced to callers, and an in-memory mock backend shared by tests
//! across the workspace.

pub mod connection;
pub mod errors;

// Re-export commonly used types for convenience
pub use connection::*;
pub use errors::*;
