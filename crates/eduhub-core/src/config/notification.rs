//! Notification engine configuration.

use serde::{Deserialize, Serialize};

/// Settings for notification fan-out and retention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Highest grade value that is still considered unsatisfactory.
    ///
    /// Grades at or below this value produce `bad_grade` notifications and
    /// are eligible for guardian fan-out; anything above is a `good_grade`
    /// and reaches the student only.
    #[serde(default = "default_bad_grade_max")]
    pub bad_grade_max: i16,
    /// Capacity of the in-process event channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Days after which read notifications are purged.
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    /// Cron expression for the cleanup job (seconds precision).
    #[serde(default = "default_cleanup_cron")]
    pub cleanup_cron: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            bad_grade_max: default_bad_grade_max(),
            channel_capacity: default_channel_capacity(),
            retention_days: default_retention_days(),
            cleanup_cron: default_cleanup_cron(),
        }
    }
}

fn default_bad_grade_max() -> i16 {
    3
}

fn default_channel_capacity() -> usize {
    1024
}

fn default_retention_days() -> i64 {
    180
}

fn default_cleanup_cron() -> String {
    "0 0 3 * * *".to_string()
}
