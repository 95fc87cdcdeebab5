//! Configuration module
//!
//! Configuration is read from the process environment at startup and passed
//! down by value; nothing in the access layer reads the environment after
//! construction. Sub-modules:
//! - `database` - Database server, credentials, and pool configuration
//! - `environment` - Deployment environment detection

pub mod database;
pub mod environment;

// Re-export commonly used types
pub use database::DatabaseConfig;
pub use environment::Environment;
