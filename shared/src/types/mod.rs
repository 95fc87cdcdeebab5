//! Type definitions module
//!
//! - `tenant` - Tenant identity for the multi-tenant catalog

pub mod tenant;

// Re-export commonly used types at module level
pub use tenant::TenantId;
