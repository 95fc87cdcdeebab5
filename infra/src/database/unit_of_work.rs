//! Unit-of-work execution
//!
//! [`Database`] is the handle request handlers receive by injection. Each
//! call to [`with_unit_of_work`] scopes one closure to one session and one
//! transaction: commit on success, rollback on failure, drain leftover
//! result sets, release. Cleanup failures are logged and swallowed so they
//! never replace the primary outcome.
//!
//! [`with_unit_of_work`]: Database::with_unit_of_work

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use smp_core::connection::{Connection, ConnectionFactory};
use smp_core::errors::DataAccessResult;
use tracing::{debug, warn};

use super::pool::{ConnectionPool, PoolStatistics};

#[cfg(feature = "mysql")]
use super::mysql::MySqlSessionFactory;
#[cfg(feature = "mysql")]
use smp_shared::config::DatabaseConfig;

/// Boxed future tied to the borrow of the session it runs on
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Handle on the data access layer
///
/// Cloning is cheap and clones share one pool. Handlers receive a
/// `Database` by dependency injection; nothing in the layer is a global.
pub struct Database<F: ConnectionFactory> {
    pool: Arc<ConnectionPool<F>>,
}

impl<F: ConnectionFactory> Clone for Database<F> {
    fn clone(&self) -> Self {
        Self {
            pool: Arc::clone(&self.pool),
        }
    }
}

impl<F: ConnectionFactory> Database<F> {
    /// Build a handle over any session factory
    pub fn with_factory(factory: F, pool_capacity: usize, checkout_timeout: Duration) -> Self {
        Self {
            pool: Arc::new(ConnectionPool::new(factory, pool_capacity, checkout_timeout)),
        }
    }

    /// Run `body` inside one transaction on one pooled session
    ///
    /// The session arrives with an implicitly opened transaction (autocommit
    /// is off). When `body` returns `Ok`, the transaction is committed and a
    /// commit failure becomes the call's error. When `body` or the commit
    /// fails, a rollback is attempted and its own failure is logged and
    /// swallowed, never replacing the primary error. Leftover result sets
    /// are drained and the session is released in every case, so a caller
    /// can neither leak a session nor poison the next checkout.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use smp_core::errors::DataAccessError;
    /// use smp_infra::database::Database;
    /// use smp_shared::config::DatabaseConfig;
    ///
    /// # async fn demo() -> smp_core::errors::DataAccessResult<()> {
    /// let db = Database::mysql(DatabaseConfig::from_env());
    /// let total: i64 = db
    ///     .with_unit_of_work(|session| {
    ///         Box::pin(async move {
    ///             let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
    ///                 .fetch_one(session.executor())
    ///                 .await
    ///                 .map_err(DataAccessError::statement)?;
    ///             Ok(row.0)
    ///         })
    ///     })
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn with_unit_of_work<T, B>(&self, body: B) -> DataAccessResult<T>
    where
        B: for<'c> FnOnce(&'c mut F::Conn) -> BoxFuture<'c, DataAccessResult<T>>,
    {
        let mut conn = self.pool.acquire().await?;

        let mut outcome = body(&mut conn).await;

        if outcome.is_ok() {
            if let Err(error) = conn.commit().await {
                outcome = Err(error);
            }
        }

        if outcome.is_err() {
            if let Err(error) = conn.rollback().await {
                warn!(%error, "rollback failed after an aborted unit of work");
            }
        }

        if let Err(error) = conn.drain().await {
            debug!(%error, "failed to drain leftover result sets");
        }

        self.pool.release(conn).await;
        outcome
    }

    /// Probe the layer end to end
    ///
    /// Checks a session out, probes it, and returns it to the pool.
    pub async fn health_check(&self) -> DataAccessResult<()> {
        let mut conn = self.pool.acquire().await?;
        let verdict = conn.ping().await;
        self.pool.release(conn).await;
        verdict
    }

    /// Snapshot of pool occupancy and lifetime counters
    pub fn statistics(&self) -> PoolStatistics {
        self.pool.statistics()
    }

    /// Close the pool and every idle session in it
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(feature = "mysql")]
impl Database<MySqlSessionFactory> {
    /// Build the MySQL-backed layer from configuration
    ///
    /// Construction opens nothing; the pool primes itself on first use.
    pub fn mysql(config: DatabaseConfig) -> Self {
        let checkout_timeout = Duration::from_secs(config.checkout_timeout);
        let pool_capacity = config.pool_capacity;
        let factory = MySqlSessionFactory::new(&config);
        Self::with_factory(factory, pool_capacity, checkout_timeout)
    }
}
