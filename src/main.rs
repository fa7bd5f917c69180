//! EduHub Notifier: academic event fan-out service
//!
//! Main entry point that wires all crates together. Academic events arrive
//! as newline-delimited JSON on stdin and are fanned out into student and
//! guardian notifications.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use eduhub_core::config::AppConfig;
use eduhub_core::events::DomainEvent;
use eduhub_database::repositories::NotificationRepository;
use eduhub_database::{DatabasePool, PgFanoutStore};
use eduhub_service::notification::FanoutOrchestrator;
use eduhub_worker::executor::JobExecutor;
use eduhub_worker::jobs::NotificationCleanupJob;
use eduhub_worker::{CronScheduler, EventPublisher, FanoutRunner, event_channel};

#[tokio::main]
async fn main() {
    let env = std::env::var("EDUHUB_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Notifier error: {:#}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(config.logging.with_target)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(config.logging.with_target)
                .init();
        }
    }
}

/// Main run function
async fn run(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting EduHub Notifier v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database)
        .await
        .context("Database connection failed")?;
    if !db.health_check().await.context("Database health check failed")? {
        anyhow::bail!("Database health check returned an unexpected result");
    }
    db.migrate_if_enabled(&config.database)
        .await
        .context("Migration failed")?;
    let pool = db.pool().clone();

    // ── Step 2: Scheduled maintenance ────────────────────────────
    let mut executor = JobExecutor::new();
    executor.register(Arc::new(NotificationCleanupJob::new(
        Arc::new(NotificationRepository::new(pool.clone())),
        config.notifications.retention_days,
    )));
    let mut scheduler = CronScheduler::new(Arc::new(executor)).await?;
    scheduler
        .register_default_tasks(&config.notifications)
        .await?;
    scheduler.start().await?;

    // ── Step 3: Fan-out runner ───────────────────────────────────
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let runner_handle = if config.worker.enabled {
        let orchestrator = Arc::new(FanoutOrchestrator::new(
            Arc::new(PgFanoutStore::new(pool.clone())),
            &config.notifications,
        ));
        let (publisher, events) = event_channel(config.notifications.channel_capacity);
        let runner = FanoutRunner::new(orchestrator, config.worker.clone());

        tokio::spawn(ingest_stdin(publisher));
        Some(tokio::spawn(async move { runner.run(events, cancel_rx).await }))
    } else {
        tracing::warn!("Fan-out worker disabled (worker.enabled = false)");
        None
    };

    // ── Step 4: Wait for shutdown ────────────────────────────────
    match runner_handle {
        Some(mut handle) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received");
                    let _ = cancel_tx.send(true);
                    handle.await.context("Fan-out runner panicked")?;
                }
                summary = &mut handle => {
                    let summary = summary.context("Fan-out runner panicked")?;
                    tracing::info!("Event input exhausted: {:?}", summary);
                }
            }
        }
        None => {
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for shutdown signal")?;
            tracing::info!("Shutdown signal received");
        }
    }

    scheduler.shutdown().await?;
    db.close().await;
    tracing::info!("EduHub Notifier stopped");
    Ok(())
}

/// Publish newline-delimited JSON events from stdin until EOF
async fn ingest_stdin(publisher: EventPublisher) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read event input: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<DomainEvent>(&line) {
            Ok(event) => {
                if let Err(e) = publisher.publish(event).await {
                    tracing::error!("{}", e);
                    break;
                }
            }
            Err(e) => tracing::warn!("Skipping malformed event: {}", e),
        }
    }
    tracing::info!("Event input closed");
}
