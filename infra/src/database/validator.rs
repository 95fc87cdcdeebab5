//! Session liveness validation

use smp_core::connection::Connection;
use tracing::debug;

/// Probe a session and report liveness as a plain verdict
///
/// Used on both sides of the pool: before a pooled session is handed to a
/// caller and before a returned one is parked. Never raises; a failed
/// probe is logged and the verdict is `false`, which means discard, not
/// retry.
pub async fn is_alive<C: Connection>(conn: &mut C) -> bool {
    match conn.ping().await {
        Ok(()) => true,
        Err(error) => {
            debug!(%error, "liveness probe failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use smp_core::connection::{ConnectionFactory, MockConnectionFactory};

    use super::*;

    #[tokio::test]
    async fn test_fresh_session_is_alive() {
        let factory = MockConnectionFactory::new();
        let mut conn = factory.create().await.unwrap();
        assert!(is_alive(&mut conn).await);
    }

    #[tokio::test]
    async fn test_killed_session_is_not_alive() {
        let factory = MockConnectionFactory::new();
        let mut conn = factory.create().await.unwrap();
        factory.state().kill(conn.id()).await;
        assert!(!is_alive(&mut conn).await);
    }
}
