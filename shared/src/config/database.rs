//! Database configuration module

use serde::{Deserialize, Serialize};

/// Connection settings for the platform's MySQL server.
///
/// Deployments populate this from the process environment via [`from_env`];
/// tests and embedders use [`new`] plus the builder methods. Timeouts are
/// plain seconds; consumers build `Duration`s where they need them.
///
/// [`from_env`]: DatabaseConfig::from_env
/// [`new`]: DatabaseConfig::new
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database server hostname or IP address
    pub host: String,

    /// Database server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database (schema) name
    pub database: String,

    /// Login user
    pub username: String,

    /// Login password
    #[serde(default)]
    pub password: String,

    /// Number of idle connections the pool keeps; 0 disables pooling
    #[serde(default = "default_pool_capacity")]
    pub pool_capacity: usize,

    /// Seconds a caller waits for an idle connection before one is created
    /// outside the pool
    #[serde(default = "default_checkout_timeout")]
    pub checkout_timeout: u64,

    /// Seconds allowed for the initial handshake
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Seconds a single statement may run on the server
    #[serde(default = "default_statement_timeout")]
    pub statement_timeout: u64,

    /// Require TLS on the server link
    #[serde(default = "default_require_tls")]
    pub require_tls: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: String::from("localhost"),
            port: default_port(),
            database: String::from("smp"),
            username: String::from("smp_admin"),
            password: String::new(),
            pool_capacity: default_pool_capacity(),
            checkout_timeout: default_checkout_timeout(),
            connect_timeout: default_connect_timeout(),
            statement_timeout: default_statement_timeout(),
            require_tls: default_require_tls(),
        }
    }
}

impl DatabaseConfig {
    /// Create from environment variables
    ///
    /// Missing variables fall back to defaults; unparsable numeric values
    /// fall back to defaults as well rather than failing startup.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = std::env::var("DB_SERVER").unwrap_or(defaults.host);
        let port = std::env::var("DB_PORT")
            .unwrap_or_else(|_| default_port().to_string())
            .parse()
            .unwrap_or_else(|_| default_port());
        let database = std::env::var("DB_NAME").unwrap_or(defaults.database);
        let username = std::env::var("DB_USER").unwrap_or(defaults.username);
        let password = std::env::var("DB_PASSWORD").unwrap_or_default();
        let pool_capacity = std::env::var("DB_POOL_SIZE")
            .unwrap_or_else(|_| default_pool_capacity().to_string())
            .parse()
            .unwrap_or_else(|_| default_pool_capacity());
        let checkout_timeout = std::env::var("DB_POOL_TIMEOUT")
            .unwrap_or_else(|_| default_checkout_timeout().to_string())
            .parse()
            .unwrap_or_else(|_| default_checkout_timeout());
        let connect_timeout = std::env::var("DB_CONNECT_TIMEOUT")
            .unwrap_or_else(|_| default_connect_timeout().to_string())
            .parse()
            .unwrap_or_else(|_| default_connect_timeout());
        let statement_timeout = std::env::var("DB_STATEMENT_TIMEOUT")
            .unwrap_or_else(|_| default_statement_timeout().to_string())
            .parse()
            .unwrap_or_else(|_| default_statement_timeout());
        let require_tls = std::env::var("DB_REQUIRE_TLS")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or_else(|_| default_require_tls());

        Self {
            host,
            port,
            database,
            username,
            password,
            pool_capacity,
            checkout_timeout,
            connect_timeout,
            statement_timeout,
            require_tls,
        }
    }

    /// Create a new configuration for a server and schema
    pub fn new(host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            database: database.into(),
            ..Default::default()
        }
    }

    /// Set the login credentials
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Set the server port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the number of idle connections the pool keeps
    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    /// Set how long a caller waits for an idle connection, in seconds
    pub fn with_checkout_timeout(mut self, seconds: u64) -> Self {
        self.checkout_timeout = seconds;
        self
    }

    /// Set the server-side statement timeout, in seconds
    pub fn with_statement_timeout(mut self, seconds: u64) -> Self {
        self.statement_timeout = seconds;
        self
    }

    /// Require or relax TLS on the server link
    pub fn with_tls(mut self, require: bool) -> Self {
        self.require_tls = require;
        self
    }
}

fn default_port() -> u16 {
    3306
}

fn default_pool_capacity() -> usize {
    5
}

fn default_checkout_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_statement_timeout() -> u64 {
    30
}

fn default_require_tls() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = DatabaseConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 3306);
        assert_eq!(config.pool_capacity, 5);
        assert_eq!(config.checkout_timeout, 30);
        assert_eq!(config.statement_timeout, 30);
        assert!(config.require_tls);
        assert!(config.password.is_empty());
    }

    #[test]
    fn test_builder_methods() {
        let config = DatabaseConfig::new("db.internal", "smp")
            .with_credentials("svc_admin", "secret")
            .with_port(3307)
            .with_pool_capacity(2)
            .with_checkout_timeout(5)
            .with_statement_timeout(60)
            .with_tls(false);

        assert_eq!(config.host, "db.internal");
        assert_eq!(config.database, "smp");
        assert_eq!(config.username, "svc_admin");
        assert_eq!(config.password, "secret");
        assert_eq!(config.port, 3307);
        assert_eq!(config.pool_capacity, 2);
        assert_eq!(config.checkout_timeout, 5);
        assert_eq!(config.statement_timeout, 60);
        assert!(!config.require_tls);
    }
}
