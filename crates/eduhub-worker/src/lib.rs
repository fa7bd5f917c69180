//! Event dispatch and scheduled tasks for EduHub notifications.
//!
//! This crate provides:
//! - An event publisher and a runner that fans events out concurrently
//! - A cron scheduler for periodic maintenance tasks
//! - A job executor that dispatches scheduled work to the correct handler
//! - The notification cleanup job

pub mod dispatcher;
pub mod executor;
pub mod jobs;
pub mod runner;
pub mod scheduler;

pub use dispatcher::{EventPublisher, event_channel};
pub use runner::{FanoutRunner, RunSummary};
pub use scheduler::CronScheduler;
