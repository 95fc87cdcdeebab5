//! Integration tests for the pooled unit-of-work runner
//!
//! These drive the public API end to end over the mock session factory;
//! no external services are required.
//!
//! Run with: `cargo test -p smp_infra --test unit_of_work_integration`

use std::time::{Duration, Instant};

use smp_core::connection::MockConnectionFactory;
use smp_core::errors::{DataAccessError, DataAccessResult};
use smp_infra::database::Database;

#[tokio::test]
async fn test_three_callers_on_a_capacity_two_pool() {
    let factory = MockConnectionFactory::new();
    let state = factory.state();
    let db = Database::with_factory(factory, 2, Duration::from_millis(150));

    let started = Instant::now();
    let mut handles = Vec::new();
    for caller in 0..3u32 {
        let db = db.clone();
        handles.push(tokio::spawn(async move {
            db.with_unit_of_work(move |conn| {
                Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(400)).await;
                    conn.execute(&format!("INSERT INTO orders (caller) VALUES ({caller})"))
                        .await?;
                    Ok(caller)
                })
            })
            .await
        }));
    }

    let mut completed = Vec::new();
    for handle in handles {
        completed.push(handle.await.unwrap().unwrap());
    }
    completed.sort_unstable();
    assert_eq!(completed, vec![0, 1, 2]);

    // Two callers ran on pooled sessions and the third on an ad-hoc one,
    // all in parallel rather than serialized behind the pool
    let elapsed = started.elapsed();
    assert!(
        elapsed < Duration::from_millis(1500),
        "callers serialized: {elapsed:?}"
    );

    let stats = db.statistics();
    assert_eq!(stats.reused, 2);
    assert_eq!(stats.direct, 1);
    assert_eq!(stats.created, 3);
    assert_eq!(stats.idle, 2);
    assert_eq!(state.closed_count().await, 1);

    for caller in 0..3u32 {
        assert!(
            state
                .has_committed(&format!("INSERT INTO orders (caller) VALUES ({caller})"))
                .await
        );
    }
}

#[tokio::test]
async fn test_commit_and_rollback_visibility_through_the_public_api() {
    let factory = MockConnectionFactory::new();
    let state = factory.state();
    let db = Database::with_factory(factory, 1, Duration::from_millis(100));

    db.with_unit_of_work(|conn| {
        Box::pin(async move {
            conn.execute("INSERT INTO tenants (name) VALUES ('acme')").await?;
            Ok(())
        })
    })
    .await
    .unwrap();

    let failed: DataAccessResult<()> = db
        .with_unit_of_work(|conn| {
            Box::pin(async move {
                conn.execute("INSERT INTO tenants (name) VALUES ('vanishing')").await?;
                Err(DataAccessError::statement("tenant quota exceeded"))
            })
        })
        .await;
    assert!(failed.is_err());

    assert!(state.has_committed("INSERT INTO tenants (name) VALUES ('acme')").await);
    assert!(!state.has_committed("INSERT INTO tenants (name) VALUES ('vanishing')").await);
    assert_eq!(state.commits(), 1);
    assert_eq!(state.rollbacks(), 1);
}
