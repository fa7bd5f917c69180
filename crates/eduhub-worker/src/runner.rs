//! Fan-out runner: receives events from the channel and handles them
//! concurrently.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc, watch};
use tracing;

use eduhub_core::config::WorkerConfig;
use eduhub_core::events::DomainEvent;
use eduhub_service::notification::{FanoutOrchestrator, FanoutOutcome};

/// Totals of one [`FanoutRunner::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Events handed to the orchestrator.
    pub dispatched: usize,
    /// Events whose notifications were committed.
    pub committed: usize,
    /// Events gated out.
    pub skipped: usize,
    /// Events rolled back.
    pub rolled_back: usize,
}

#[derive(Debug, Default)]
struct Counters {
    committed: AtomicUsize,
    skipped: AtomicUsize,
    rolled_back: AtomicUsize,
}

impl Counters {
    fn record(&self, outcome: &FanoutOutcome) {
        let counter = match outcome {
            FanoutOutcome::Committed { .. } => &self.committed,
            FanoutOutcome::Skipped { .. } => &self.skipped,
            FanoutOutcome::RolledBack { .. } => &self.rolled_back,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Runs the fan-out orchestrator over a stream of events
#[derive(Debug)]
pub struct FanoutRunner {
    /// Per-event fan-out logic
    orchestrator: Arc<FanoutOrchestrator>,
    /// Worker configuration
    config: WorkerConfig,
}

impl FanoutRunner {
    /// Create a new runner
    pub fn new(orchestrator: Arc<FanoutOrchestrator>, config: WorkerConfig) -> Self {
        Self {
            orchestrator,
            config,
        }
    }

    /// Handle events until the cancel signal fires or every publisher is
    /// dropped. Events already buffered in the channel are still handled, and
    /// in-flight events get `shutdown_grace_seconds` to finish.
    pub async fn run(
        &self,
        mut events: mpsc::Receiver<DomainEvent>,
        mut cancel: watch::Receiver<bool>,
    ) -> RunSummary {
        let concurrency = self.config.concurrency.max(1);
        tracing::info!("Fan-out runner started with concurrency={}", concurrency);

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let counters = Arc::new(Counters::default());
        let mut dispatched = 0;

        loop {
            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        tracing::info!("Fan-out runner received shutdown signal");
                        break;
                    }
                }
                next = events.recv() => match next {
                    Some(event) => {
                        self.dispatch(event, &semaphore, &counters).await;
                        dispatched += 1;
                    }
                    None => {
                        tracing::info!("All event publishers dropped");
                        break;
                    }
                },
            }
        }

        events.close();
        while let Some(event) = events.recv().await {
            self.dispatch(event, &semaphore, &counters).await;
            dispatched += 1;
        }

        tracing::info!("Fan-out runner waiting for in-flight events to complete...");
        let grace = Duration::from_secs(self.config.shutdown_grace_seconds);
        if tokio::time::timeout(grace, semaphore.acquire_many(concurrency as u32))
            .await
            .is_err()
        {
            tracing::warn!(
                "Fan-out runner shutdown grace of {}s elapsed with events in flight",
                self.config.shutdown_grace_seconds
            );
        }

        let summary = RunSummary {
            dispatched,
            committed: counters.committed.load(Ordering::Relaxed),
            skipped: counters.skipped.load(Ordering::Relaxed),
            rolled_back: counters.rolled_back.load(Ordering::Relaxed),
        };
        tracing::info!(
            dispatched = summary.dispatched,
            committed = summary.committed,
            skipped = summary.skipped,
            rolled_back = summary.rolled_back,
            "Fan-out runner shut down complete"
        );
        summary
    }

    /// Wait for a free slot, then handle the event on its own task
    async fn dispatch(
        &self,
        event: DomainEvent,
        semaphore: &Arc<Semaphore>,
        counters: &Arc<Counters>,
    ) {
        let permit = match Arc::clone(semaphore).acquire_owned().await {
            Ok(p) => p,
            Err(e) => {
                tracing::error!("Fan-out semaphore closed, dropping event {}: {}", event.id, e);
                return;
            }
        };

        let orchestrator = Arc::clone(&self.orchestrator);
        let counters = Arc::clone(counters);
        tokio::spawn(async move {
            let _permit = permit;
            let outcome = orchestrator.handle(&event).await;
            tracing::debug!("Event {} finished: {:?}", event.id, outcome);
            counters.record(&outcome);
        });
    }
}
