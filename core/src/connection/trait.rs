//! Session contract for the data access layer
//!
//! The pool and the unit-of-work runner are generic over these two traits.
//! The MySQL backend in the infrastructure crate is the shipped
//! implementation; the mock backend in this crate stands in for it in
//! tests.

use async_trait::async_trait;

use crate::errors::DataAccessResult;

/// One live session to the database server.
///
/// Sessions come out of a [`ConnectionFactory`] with autocommit disabled:
/// the first statement opens a transaction implicitly and nothing becomes
/// durable before [`commit`](Connection::commit). This trait carries only
/// the lifecycle operations the layer itself drives; statements are
/// executed against the concrete session type, which keeps the layer free
/// of any query-building surface.
#[async_trait]
pub trait Connection: Send {
    /// Cheap liveness probe.
    ///
    /// # Errors
    ///
    /// Returns [`DataAccessError::Stale`] when the session is no longer
    /// usable. The caller decides whether to discard; the probe itself has
    /// no side effects.
    ///
    /// [`DataAccessError::Stale`]: crate::errors::DataAccessError::Stale
    async fn ping(&mut self) -> DataAccessResult<()>;

    /// Commit the current transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DataAccessError::Commit`] when the server rejects or fails
    /// the commit; the work of the transaction is not durable in that case.
    ///
    /// [`DataAccessError::Commit`]: crate::errors::DataAccessError::Commit
    async fn commit(&mut self) -> DataAccessResult<()>;

    /// Roll back the current transaction.
    async fn rollback(&mut self) -> DataAccessResult<()>;

    /// Consume any leftover result sets so the session is clean for reuse.
    ///
    /// Stored procedures routinely leave extra result sets behind; a
    /// session returned to the pool with pending results would corrupt its
    /// next use.
    async fn drain(&mut self) -> DataAccessResult<()>;

    /// Tear the session down gracefully.
    async fn close(self) -> DataAccessResult<()>;
}

/// Opens configured, transaction-ready sessions.
///
/// A factory is cheap to share (`Send + Sync`) and holds no live server
/// state, only the configuration needed to open sessions.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Session type this factory produces.
    type Conn: Connection;

    /// Open a fresh session in a single attempt: no retries, no validation
    /// probe.
    ///
    /// # Errors
    ///
    /// Returns [`DataAccessError::Connect`] on any handshake,
    /// authentication, or session setup failure.
    ///
    /// [`DataAccessError::Connect`]: crate::errors::DataAccessError::Connect
    async fn create(&self) -> DataAccessResult<Self::Conn>;
}
