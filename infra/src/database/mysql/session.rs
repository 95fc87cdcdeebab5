//! MySQL session type

use async_trait::async_trait;
use smp_core::connection::Connection;
use smp_core::errors::{DataAccessError, DataAccessResult};
use sqlx::Connection as SqlxConnection;
use sqlx::MySqlConnection;

/// One live MySQL session
///
/// Wraps a raw SQLx connection opened by
/// [`MySqlSessionFactory`](super::MySqlSessionFactory) with autocommit off.
/// Inside a unit of work, callers run their statements against
/// [`executor`](MySqlSession::executor); the lifecycle methods below are
/// driven by the pool and the unit-of-work runner.
pub struct MySqlSession {
    conn: MySqlConnection,
}

impl MySqlSession {
    pub(crate) fn new(conn: MySqlConnection) -> Self {
        Self { conn }
    }

    /// Executor for running statements on this session
    pub fn executor(&mut self) -> &mut MySqlConnection {
        &mut self.conn
    }
}

#[async_trait]
impl Connection for MySqlSession {
    async fn ping(&mut self) -> DataAccessResult<()> {
        self.conn.ping().await.map_err(DataAccessError::stale)
    }

    async fn commit(&mut self) -> DataAccessResult<()> {
        sqlx::query("COMMIT")
            .execute(&mut self.conn)
            .await
            .map(|_| ())
            .map_err(DataAccessError::commit)
    }

    async fn rollback(&mut self) -> DataAccessResult<()> {
        sqlx::query("ROLLBACK")
            .execute(&mut self.conn)
            .await
            .map(|_| ())
            .map_err(DataAccessError::release)
    }

    async fn drain(&mut self) -> DataAccessResult<()> {
        // Consumes protocol state a caller left behind, result sets included
        self.conn.flush().await.map_err(DataAccessError::release)
    }

    async fn close(self) -> DataAccessResult<()> {
        self.conn.close().await.map_err(DataAccessError::release)
    }
}
