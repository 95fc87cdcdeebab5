//! Shared configuration and common types for the SMP backend
//!
//! This crate provides functionality used across the server crates:
//! - Configuration types sourced from the process environment
//! - Tenant identity types

pub mod config;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{DatabaseConfig, Environment};
pub use types::TenantId;
