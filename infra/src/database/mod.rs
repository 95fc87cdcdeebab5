//! Database module - session pooling and unit-of-work execution
//!
//! This module provides the data access layer implementation:
//! - Bounded session pool with liveness validation on both sides
//! - Unit-of-work runner with commit/rollback discipline
//! - MySQL backend over raw SQLx sessions

pub mod pool;
pub mod unit_of_work;
pub mod validator;

#[cfg(feature = "mysql")]
pub mod mysql;


// Re-export commonly used types
pub use pool::{ConnectionPool, PoolStatistics};
pub use unit_of_work::{BoxFuture, Database};

#[cfg(feature = "mysql")]
pub use mysql::{MySqlDatabase, MySqlSession, MySqlSessionFactory};
