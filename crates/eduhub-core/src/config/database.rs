//! Database configuration.

use serde::{Deserialize, Serialize};

/// PostgreSQL connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    ///
    /// Every in-flight fan-out holds one connection for the lifetime of its
    /// transaction, so this should be at least `worker.concurrency`.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of idle connections kept open.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait when acquiring a connection.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
    /// Seconds before an idle connection is closed.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// Whether embedded migrations run on startup.
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_acquire_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}

fn default_true() -> bool {
    true
}
