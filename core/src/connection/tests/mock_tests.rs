//! Unit tests for the mock connection backend

use crate::connection::{Connection, ConnectionFactory, MockConnectionFactory};
use crate::errors::DataAccessError;

#[tokio::test]
async fn test_commit_publishes_staged_statements() {
    let factory = MockConnectionFactory::new();
    let state = factory.state();
    let mut conn = factory.create().await.unwrap();

    conn.execute("INSERT INTO products (name) VALUES ('a')").await.unwrap();
    conn.execute("UPDATE products SET name = 'b'").await.unwrap();
    assert_eq!(conn.staged().len(), 2);
    assert!(!state.has_committed("INSERT INTO products (name) VALUES ('a')").await);

    conn.commit().await.unwrap();
    assert!(conn.staged().is_empty());
    assert!(state.has_committed("INSERT INTO products (name) VALUES ('a')").await);
    assert!(state.has_committed("UPDATE products SET name = 'b'").await);
}

#[tokio::test]
async fn test_rollback_discards_staged_statements() {
    let factory = MockConnectionFactory::new();
    let state = factory.state();
    let mut conn = factory.create().await.unwrap();

    conn.execute("INSERT INTO products (name) VALUES ('a')").await.unwrap();
    conn.rollback().await.unwrap();

    assert!(conn.staged().is_empty());
    assert!(state.committed_statements().await.is_empty());

    // The session remains usable after a rollback
    conn.execute("INSERT INTO products (name) VALUES ('b')").await.unwrap();
    conn.commit().await.unwrap();
    assert_eq!(state.committed_statements().await.len(), 1);
}

#[tokio::test]
async fn test_killed_session_fails_probe_and_statements() {
    let factory = MockConnectionFactory::new();
    let state = factory.state();
    let mut conn = factory.create().await.unwrap();

    conn.ping().await.unwrap();
    state.kill(conn.id()).await;

    assert!(matches!(conn.ping().await, Err(DataAccessError::Stale { .. })));
    assert!(matches!(
        conn.execute("SELECT 1").await,
        Err(DataAccessError::Statement { .. })
    ));
}

#[tokio::test]
async fn test_scripted_connect_failures_then_recovery() {
    let factory = MockConnectionFactory::new();
    factory.state().fail_next_connects(2);

    assert!(matches!(
        factory.create().await,
        Err(DataAccessError::Connect { .. })
    ));
    assert!(factory.create().await.is_err());
    assert!(factory.create().await.is_ok());
    assert_eq!(factory.state().opened(), 1);
}

#[tokio::test]
async fn test_pending_result_sets_block_statements_until_drained() {
    let factory = MockConnectionFactory::new();
    let mut conn = factory.create().await.unwrap();

    conn.execute_proc("EXEC sp_create_product", 2).await.unwrap();
    assert!(conn.execute("SELECT 1").await.is_err());

    conn.drain().await.unwrap();
    conn.execute("SELECT 1").await.unwrap();
}

#[tokio::test]
async fn test_close_is_recorded() {
    let factory = MockConnectionFactory::new();
    let state = factory.state();
    let conn = factory.create().await.unwrap();
    let id = conn.id();

    assert!(!state.is_closed(id).await);
    conn.close().await.unwrap();
    assert!(state.is_closed(id).await);
    assert_eq!(state.closed_count().await, 1);
}

#[tokio::test]
async fn test_failed_commit_leaves_statements_staged() {
    let factory = MockConnectionFactory::new();
    let state = factory.state();
    let mut conn = factory.create().await.unwrap();

    conn.execute("INSERT INTO products (name) VALUES ('a')").await.unwrap();
    state.fail_next_commit();

    assert!(matches!(conn.commit().await, Err(DataAccessError::Commit { .. })));
    assert_eq!(conn.staged().len(), 1);
    assert!(state.committed_statements().await.is_empty());

    // A later commit succeeds and publishes the still-staged work
    conn.commit().await.unwrap();
    assert_eq!(state.committed_statements().await.len(), 1);
}

#[tokio::test]
async fn test_sessions_get_unique_ids() {
    let factory = MockConnectionFactory::new();
    let a = factory.create().await.unwrap();
    let b = factory.create().await.unwrap();
    assert_ne!(a.id(), b.id());
    assert_eq!(factory.state().opened(), 2);
}
