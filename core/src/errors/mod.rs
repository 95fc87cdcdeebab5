//! Error taxonomy for the data access layer.
//!
//! Callers of the layer only ever see `Connect`, `Statement`, and `Commit`.
//! `Stale` is raised by liveness probes and consumed inside the pool, which
//! recovers by discarding the session; `Release` is raised during cleanup
//! and is logged and swallowed by the layer. All variants keep the
//! underlying driver error as their `source`, so nothing about the failure
//! is lost on the way up.

use thiserror::Error;

/// Boxed error preserving the driver-level failure as a source.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by the data access layer
#[derive(Error, Debug)]
pub enum DataAccessError {
    /// Opening a session failed: network, authentication, TLS, or session
    /// setup trouble during the handshake.
    #[error("could not open a database connection: {source}")]
    Connect {
        #[source]
        source: BoxedError,
    },

    /// A session failed its liveness probe and must be discarded.
    #[error("database connection failed its liveness probe: {source}")]
    Stale {
        #[source]
        source: BoxedError,
    },

    /// A statement failed inside a unit of work.
    #[error("database statement failed: {source}")]
    Statement {
        #[source]
        source: BoxedError,
    },

    /// Committing a unit of work failed; the work is not durable.
    #[error("transaction commit failed: {source}")]
    Commit {
        #[source]
        source: BoxedError,
    },

    /// Cleanup failed while rolling back, draining, closing, or returning
    /// a session.
    #[error("connection cleanup failed: {source}")]
    Release {
        #[source]
        source: BoxedError,
    },
}

impl DataAccessError {
    /// Wrap a handshake or session setup failure
    pub fn connect(source: impl Into<BoxedError>) -> Self {
        Self::Connect { source: source.into() }
    }

    /// Wrap a failed liveness probe
    pub fn stale(source: impl Into<BoxedError>) -> Self {
        Self::Stale { source: source.into() }
    }

    /// Wrap a statement failure
    pub fn statement(source: impl Into<BoxedError>) -> Self {
        Self::Statement { source: source.into() }
    }

    /// Wrap a commit failure
    pub fn commit(source: impl Into<BoxedError>) -> Self {
        Self::Commit { source: source.into() }
    }

    /// Wrap a cleanup failure
    pub fn release(source: impl Into<BoxedError>) -> Self {
        Self::Release { source: source.into() }
    }
}

pub type DataAccessResult<T> = Result<T, DataAccessError>;
