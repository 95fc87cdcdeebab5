//! # Infrastructure Layer
//!
//! Operational layer of the SMP data access stack. It owns the session
//! pool and the unit-of-work runner, both generic over the contract in
//! `smp_core`, and ships the MySQL backend implemented with SQLx.
//!
//! ## Architecture
//!
//! - **Pool**: bounded idle set, validated on checkout and checkin, with
//!   ad-hoc overflow when exhausted
//! - **Unit of work**: one session and one transaction per closure, with
//!   commit/rollback discipline and best-effort cleanup
//! - **MySQL backend**: raw SQLx sessions opened per the shared
//!   configuration
//!
//! ## Features
//!
//! - `mysql`: Enable the MySQL backend (default)
//! - `mock-services`: Expose the in-memory mock backend to dependents

// Re-export core and shared types for convenience
pub use smp_core::connection::{Connection, ConnectionFactory};
pub use smp_core::errors::{BoxedError, DataAccessError, DataAccessResult};
pub use smp_shared::config::{DatabaseConfig, Environment};

/// Database module - session pooling and unit-of-work execution
pub mod database;

use tracing::{info, warn};

/// Load the database configuration from the environment
///
/// Reads a `.env` file when present, then the process environment. The
/// resolved target is logged without credentials.
pub fn load_config() -> DataAccessResult<DatabaseConfig> {
    dotenvy::dotenv().ok(); // Load .env file if present

    let config = DatabaseConfig::from_env();
    if Environment::from_env().is_production() && !config.require_tls {
        warn!("TLS is disabled for the database link in production");
    }
    info!(
        host = %config.host,
        database = %config.database,
        pool_capacity = config.pool_capacity,
        "database configuration loaded"
    );
    Ok(config)
}

/// Build the MySQL-backed access layer from the environment
///
/// Construction is cheap: the pool opens its sessions lazily, on first use.
#[cfg(feature = "mysql")]
pub fn database_from_env() -> DataAccessResult<database::MySqlDatabase> {
    let config = load_config()?;
    Ok(database::Database::mysql(config))
}
