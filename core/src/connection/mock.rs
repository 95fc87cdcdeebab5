//! In-memory mock backend for tests
//!
//! `MockState` plays the server: it keeps the committed statement log and
//! the lifecycle bookkeeping, and exposes switches that script failures
//! into the next operations. `MockConnection` stages statements privately
//! until `commit`, which is what makes transaction semantics observable in
//! tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::connection::{Connection, ConnectionFactory};
use crate::errors::{DataAccessError, DataAccessResult};

/// Shared server-side state behind every mock session
#[derive(Debug, Default)]
pub struct MockState {
    next_id: AtomicU64,
    opened: AtomicU64,
    committed: RwLock<Vec<(u64, String)>>,
    closed: RwLock<HashSet<u64>>,
    killed: RwLock<HashSet<u64>>,
    commits: AtomicU64,
    rollbacks: AtomicU64,
    connect_failures: AtomicU32,
    fail_next_commit: AtomicBool,
    fail_next_rollback: AtomicBool,
    fail_next_drain: AtomicBool,
}

impl MockState {
    /// Number of sessions the factory has opened
    pub fn opened(&self) -> u64 {
        self.opened.load(Ordering::SeqCst)
    }

    /// Snapshot of the committed statement log as `(session id, sql)` pairs
    pub async fn committed_statements(&self) -> Vec<(u64, String)> {
        self.committed.read().await.clone()
    }

    /// True when some session committed the given statement
    pub async fn has_committed(&self, sql: &str) -> bool {
        self.committed.read().await.iter().any(|(_, s)| s == sql)
    }

    /// True when the session was closed
    pub async fn is_closed(&self, id: u64) -> bool {
        self.closed.read().await.contains(&id)
    }

    /// Number of sessions that have been closed
    pub async fn closed_count(&self) -> usize {
        self.closed.read().await.len()
    }

    /// Number of commits that succeeded
    pub fn commits(&self) -> u64 {
        self.commits.load(Ordering::SeqCst)
    }

    /// Number of rollbacks that succeeded
    pub fn rollbacks(&self) -> u64 {
        self.rollbacks.load(Ordering::SeqCst)
    }

    /// Kill a session server-side; its next probe or statement fails
    pub async fn kill(&self, id: u64) {
        self.killed.write().await.insert(id);
    }

    /// Make the next `count` factory calls fail
    pub fn fail_next_connects(&self, count: u32) {
        self.connect_failures.store(count, Ordering::SeqCst);
    }

    /// Make the next commit fail, leaving its statements staged
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Make the next rollback fail
    pub fn fail_next_rollback(&self) {
        self.fail_next_rollback.store(true, Ordering::SeqCst);
    }

    /// Make the next drain fail
    pub fn fail_next_drain(&self) {
        self.fail_next_drain.store(true, Ordering::SeqCst);
    }
}

/// Factory handing out [`MockConnection`]s with sequential ids
#[derive(Debug, Clone, Default)]
pub struct MockConnectionFactory {
    state: Arc<MockState>,
}

impl MockConnectionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle on the shared server state for scripting and assertions
    pub fn state(&self) -> Arc<MockState> {
        Arc::clone(&self.state)
    }
}

#[async_trait]
impl ConnectionFactory for MockConnectionFactory {
    type Conn = MockConnection;

    async fn create(&self) -> DataAccessResult<MockConnection> {
        let scripted = self
            .state
            .connect_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if scripted.is_ok() {
            return Err(DataAccessError::connect("injected connect failure"));
        }

        let id = self.state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockConnection {
            id,
            state: Arc::clone(&self.state),
            staged: Vec::new(),
            pending_results: 0,
        })
    }
}

/// One mock session; statements stage locally until `commit`
#[derive(Debug)]
pub struct MockConnection {
    id: u64,
    state: Arc<MockState>,
    staged: Vec<String>,
    pending_results: u32,
}

impl MockConnection {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Statements staged in the open transaction
    pub fn staged(&self) -> &[String] {
        &self.staged
    }

    /// Run a statement inside the open transaction
    pub async fn execute(&mut self, sql: &str) -> DataAccessResult<()> {
        if self.state.killed.read().await.contains(&self.id) {
            return Err(DataAccessError::statement("server closed the connection"));
        }
        if self.pending_results > 0 {
            return Err(DataAccessError::statement(
                "previous result sets were not consumed",
            ));
        }
        self.staged.push(sql.to_string());
        Ok(())
    }

    /// Run a statement that leaves extra result sets behind, the way a
    /// stored procedure call does
    pub async fn execute_proc(&mut self, sql: &str, extra_result_sets: u32) -> DataAccessResult<()> {
        self.execute(sql).await?;
        self.pending_results += extra_result_sets;
        Ok(())
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn ping(&mut self) -> DataAccessResult<()> {
        if self.state.killed.read().await.contains(&self.id) {
            return Err(DataAccessError::stale("server closed the connection"));
        }
        Ok(())
    }

    async fn commit(&mut self) -> DataAccessResult<()> {
        if self.state.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(DataAccessError::commit("injected commit failure"));
        }
        let mut committed = self.state.committed.write().await;
        let id = self.id;
        committed.extend(self.staged.drain(..).map(|sql| (id, sql)));
        self.state.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(&mut self) -> DataAccessResult<()> {
        if self.state.fail_next_rollback.swap(false, Ordering::SeqCst) {
            return Err(DataAccessError::release("injected rollback failure"));
        }
        self.staged.clear();
        self.state.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn drain(&mut self) -> DataAccessResult<()> {
        if self.state.fail_next_drain.swap(false, Ordering::SeqCst) {
            return Err(DataAccessError::release("injected drain failure"));
        }
        self.pending_results = 0;
        Ok(())
    }

    async fn close(self) -> DataAccessResult<()> {
        self.state.closed.write().await.insert(self.id);
        Ok(())
    }
}
