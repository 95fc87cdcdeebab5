//! MySQL session factory

use std::time::Duration;

use async_trait::async_trait;
use smp_core::connection::ConnectionFactory;
use smp_core::errors::{DataAccessError, DataAccessResult};
use smp_shared::config::DatabaseConfig;
use sqlx::mysql::{MySqlConnectOptions, MySqlSslMode};
use sqlx::{ConnectOptions, Connection};
use tracing::debug;

use super::MySqlSession;

/// Opens transaction-ready MySQL sessions per the shared configuration
///
/// Every session comes up with autocommit disabled and the server-side
/// statement timeout applied, so the first statement of a unit of work
/// opens its transaction implicitly. One call is one attempt: a failed
/// handshake or session setup surfaces immediately, with no retries.
pub struct MySqlSessionFactory {
    options: MySqlConnectOptions,
    connect_timeout: Duration,
    statement_timeout: Duration,
    host: String,
    database: String,
}

impl MySqlSessionFactory {
    /// Build a factory from configuration; opens nothing yet
    pub fn new(config: &DatabaseConfig) -> Self {
        let ssl_mode = if config.require_tls {
            MySqlSslMode::Required
        } else {
            MySqlSslMode::Preferred
        };
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.username)
            .password(&config.password)
            .ssl_mode(ssl_mode);

        Self {
            options,
            connect_timeout: Duration::from_secs(config.connect_timeout),
            statement_timeout: Duration::from_secs(config.statement_timeout),
            host: config.host.clone(),
            database: config.database.clone(),
        }
    }
}

#[async_trait]
impl ConnectionFactory for MySqlSessionFactory {
    type Conn = MySqlSession;

    async fn create(&self) -> DataAccessResult<MySqlSession> {
        debug!(host = %self.host, database = %self.database, "opening mysql session");

        let mut conn = match tokio::time::timeout(self.connect_timeout, self.options.connect()).await
        {
            Ok(Ok(conn)) => conn,
            Ok(Err(error)) => return Err(DataAccessError::connect(error)),
            Err(_elapsed) => return Err(DataAccessError::connect("handshake timed out")),
        };

        // Transactions are explicit on these sessions; nothing is durable
        // before COMMIT
        let session_setup = [
            String::from("SET autocommit = 0"),
            format!(
                "SET SESSION max_execution_time = {}",
                self.statement_timeout.as_millis()
            ),
        ];
        for statement in session_setup {
            if let Err(error) = sqlx::query(&statement).execute(&mut conn).await {
                let _ = conn.close().await;
                return Err(DataAccessError::connect(error));
            }
        }

        Ok(MySqlSession::new(conn))
    }
}
