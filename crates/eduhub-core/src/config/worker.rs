//! Fan-out worker configuration.

use serde::{Deserialize, Serialize};

/// Settings for the event-driven fan-out worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the worker is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Number of events processed concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Seconds to wait for in-flight events during shutdown.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            concurrency: default_concurrency(),
            shutdown_grace_seconds: default_shutdown_grace(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    4
}

fn default_shutdown_grace() -> u64 {
    30
}
