//! Bounded session pool
//!
//! The pool bounds the number of idle sessions, not the number of live
//! ones: when every pooled session is checked out past the wait budget,
//! checkout falls back to an ad-hoc session, and a returned session is
//! pooled only while a slot is free. Sessions are validated on the way out
//! and on the way in; a stale pooled session is replaced by one fresh
//! session, never by another dip into the pool.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use smp_core::connection::{Connection, ConnectionFactory};
use smp_core::errors::DataAccessResult;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

use super::validator;

/// Pool of idle database sessions
///
/// The idle set sits in a bounded channel: checkout pops from it, checkin
/// pushes without blocking. Nothing is opened at construction; the first
/// checkout primes the pool, exactly once per pool, and concurrent first
/// callers wait on that same initialization.
pub struct ConnectionPool<F: ConnectionFactory> {
    factory: F,
    capacity: usize,
    checkout_timeout: Duration,
    idle_tx: mpsc::Sender<F::Conn>,
    idle_rx: Mutex<mpsc::Receiver<F::Conn>>,
    primed: OnceCell<()>,
    counters: PoolCounters,
}

#[derive(Debug, Default)]
struct PoolCounters {
    created: AtomicU64,
    reused: AtomicU64,
    direct: AtomicU64,
    discarded: AtomicU64,
}

impl<F: ConnectionFactory> ConnectionPool<F> {
    /// Create a pool over a session factory
    ///
    /// `capacity` is the size of the idle set; zero disables pooling and
    /// every checkout opens a dedicated session. `checkout_timeout` is how
    /// long one caller waits for an idle session before falling back to an
    /// ad-hoc one.
    pub fn new(factory: F, capacity: usize, checkout_timeout: Duration) -> Self {
        // The channel needs a nonzero bound; with capacity 0 it is never used
        let (idle_tx, idle_rx) = mpsc::channel(capacity.max(1));
        info!(capacity, "connection pool created");
        Self {
            factory,
            capacity,
            checkout_timeout,
            idle_tx,
            idle_rx: Mutex::new(idle_rx),
            primed: OnceCell::new(),
            counters: PoolCounters::default(),
        }
    }

    /// Check a session out
    ///
    /// Waits up to the checkout budget for an idle session and validates it
    /// before handing it over; a stale one is closed and replaced with one
    /// fresh session. When the pool stays empty past the budget, an ad-hoc
    /// session is opened instead of failing the caller.
    ///
    /// # Errors
    ///
    /// Only session creation can fail here, with
    /// [`DataAccessError::Connect`](smp_core::errors::DataAccessError::Connect);
    /// exhaustion and stale sessions are handled, not surfaced.
    pub async fn acquire(&self) -> DataAccessResult<F::Conn> {
        if self.capacity == 0 {
            self.counters.direct.fetch_add(1, Ordering::Relaxed);
            return self.create_session().await;
        }

        self.prime().await;

        let waited = tokio::time::timeout(self.checkout_timeout, async {
            let mut idle_rx = self.idle_rx.lock().await;
            idle_rx.recv().await
        })
        .await;

        match waited {
            Ok(Some(mut conn)) => {
                if validator::is_alive(&mut conn).await {
                    self.counters.reused.fetch_add(1, Ordering::Relaxed);
                    debug!("reusing pooled session");
                    Ok(conn)
                } else {
                    warn!("pooled session failed validation, replacing it");
                    self.dispose(conn).await;
                    self.create_session().await
                }
            }
            Ok(None) => {
                // Pool closed; serve the caller anyway
                self.counters.direct.fetch_add(1, Ordering::Relaxed);
                self.create_session().await
            }
            Err(_elapsed) => {
                warn!(
                    timeout_secs = self.checkout_timeout.as_secs(),
                    "connection pool exhausted, opening an ad-hoc session"
                );
                self.counters.direct.fetch_add(1, Ordering::Relaxed);
                self.create_session().await
            }
        }
    }

    /// Return a session
    ///
    /// Never raises. A session that fails validation is closed; when the
    /// idle set is full, the session is closed instead of pooled.
    pub async fn release(&self, mut conn: F::Conn) {
        if self.capacity == 0 {
            self.dispose(conn).await;
            return;
        }

        if !validator::is_alive(&mut conn).await {
            warn!("session failed validation at check-in, closing it");
            self.dispose(conn).await;
            return;
        }

        match self.idle_tx.try_send(conn) {
            Ok(()) => debug!("session returned to the pool"),
            Err(TrySendError::Full(conn)) => {
                debug!("idle set is full, closing returned session");
                self.dispose(conn).await;
            }
            Err(TrySendError::Closed(conn)) => {
                self.dispose(conn).await;
            }
        }
    }

    /// Close the pool, tearing down every idle session
    ///
    /// Sessions still checked out re-enter through [`release`], find the
    /// idle set closed, and are closed there. Later checkouts are served
    /// with ad-hoc sessions.
    ///
    /// [`release`]: ConnectionPool::release
    pub async fn close(&self) {
        let mut idle_rx = self.idle_rx.lock().await;
        idle_rx.close();
        while let Ok(conn) = idle_rx.try_recv() {
            self.dispose(conn).await;
        }
        info!("connection pool closed");
    }

    /// Snapshot of pool occupancy and lifetime counters
    pub fn statistics(&self) -> PoolStatistics {
        let idle = self.idle_tx.max_capacity() - self.idle_tx.capacity();
        PoolStatistics {
            idle: if self.capacity == 0 { 0 } else { idle },
            capacity: self.capacity,
            created: self.counters.created.load(Ordering::Relaxed),
            reused: self.counters.reused.load(Ordering::Relaxed),
            direct: self.counters.direct.load(Ordering::Relaxed),
            discarded: self.counters.discarded.load(Ordering::Relaxed),
        }
    }

    /// Fill the idle set, once per pool
    async fn prime(&self) {
        self.primed
            .get_or_init(|| async {
                let mut filled = 0;
                for _ in 0..self.capacity {
                    match self.create_session().await {
                        Ok(conn) => match self.idle_tx.try_send(conn) {
                            Ok(()) => filled += 1,
                            Err(send_error) => {
                                self.dispose(send_error.into_inner()).await;
                                break;
                            }
                        },
                        Err(error) => {
                            warn!(%error, "failed to open a session while priming the pool");
                        }
                    }
                }
                info!(filled, capacity = self.capacity, "connection pool primed");
            })
            .await;
    }

    async fn create_session(&self) -> DataAccessResult<F::Conn> {
        let conn = self.factory.create().await?;
        self.counters.created.fetch_add(1, Ordering::Relaxed);
        Ok(conn)
    }

    /// Close a session, swallowing teardown failures
    async fn dispose(&self, conn: F::Conn) {
        self.counters.discarded.fetch_add(1, Ordering::Relaxed);
        if let Err(error) = conn.close().await {
            debug!(%error, "session teardown failed");
        }
    }
}

/// Point-in-time view of a pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStatistics {
    /// Sessions parked in the idle set
    pub idle: usize,
    /// Configured size of the idle set
    pub capacity: usize,
    /// Sessions opened over the pool's lifetime
    pub created: u64,
    /// Checkouts satisfied from the idle set
    pub reused: u64,
    /// Sessions opened outside the idle set (exhaustion or pooling disabled)
    pub direct: u64,
    /// Sessions closed by the pool
    pub discarded: u64,
}

impl std::fmt::Display for PoolStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pool Stats: {}/{} idle ({} created, {} reused, {} direct, {} discarded)",
            self.idle, self.capacity, self.created, self.reused, self.direct, self.discarded
        )
    }
}
