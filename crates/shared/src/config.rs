//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Mock gateway configuration.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Apply pending migrations at startup.
    #[serde(default = "default_auto_migrate")]
    pub auto_migrate: bool,
    /// Log every SQL statement.
    #[serde(default)]
    pub log_sql: bool,
}

impl DatabaseConfig {
    /// Configuration for a private in-memory SQLite database.
    ///
    /// Every pooled SQLite memory connection is its own database, so the pool
    /// is pinned to a single connection.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            auto_migrate: true,
            log_sql: false,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            auto_migrate: default_auto_migrate(),
            log_sql: false,
        }
    }
}

fn default_database_url() -> String {
    "sqlite://irbankmock.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_auto_migrate() -> bool {
    true
}

/// Mock gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Scheme and host prepended to endpoint paths reported to merchants,
    /// e.g. `http://localhost:3000`.
    #[serde(default = "default_public_hostname")]
    pub public_hostname: String,
    /// Directory of the buyer-facing web app.
    #[serde(default = "default_webapp_path")]
    pub webapp_path: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            public_hostname: default_public_hostname(),
            webapp_path: default_webapp_path(),
        }
    }
}

fn default_public_hostname() -> String {
    "misconfig.example.com".to_string()
}

fn default_webapp_path() -> String {
    "./web/app/out".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("IRBANKMOCK")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }
}
