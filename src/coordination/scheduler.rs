//! Claim scheduler
//!
//! Runs one cycle right away, then waits `interval` after each cycle ends
//! before starting the next. Cycles never overlap, and a failing (or
//! panicking) cycle does not stop the schedule. Shutdown is only observed
//! between cycles: a cycle that already submitted a claim always finishes.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::strategy::{AutoClaimer, CycleReport};

/// Something the scheduler can run once per tick
#[async_trait]
pub trait ClaimCycle: Send + Sync + 'static {
    async fn run_cycle(&self) -> Result<CycleReport>;
}

#[async_trait]
impl ClaimCycle for AutoClaimer {
    async fn run_cycle(&self) -> Result<CycleReport> {
        AutoClaimer::run_cycle(self).await
    }
}

pub struct ClaimScheduler<C: ClaimCycle> {
    cycle: Arc<C>,
    interval: Duration,
}

impl<C: ClaimCycle> ClaimScheduler<C> {
    pub fn new(cycle: Arc<C>, interval: Duration) -> Self {
        Self { cycle, interval }
    }

    /// Start the loop on the runtime and hand back a handle for shutdown
    pub fn spawn(self) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));
        SchedulerHandle {
            shutdown: shutdown_tx,
            task,
        }
    }

    /// Loop until `shutdown` flips to true (or its sender is dropped).
    /// Returns the number of completed cycles.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> u64 {
        info!(
            "Starting claim scheduler (interval: {}s)",
            self.interval.as_secs()
        );
        let mut completed: u64 = 0;

        loop {
            completed += 1;
            self.run_one(completed).await;

            if *shutdown.borrow() {
                break;
            }

            info!("Next check in {}s", self.interval.as_secs());
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = stop_requested(&mut shutdown) => break,
            }
        }

        info!("Claim scheduler stopped after {} cycle(s)", completed);
        completed
    }

    async fn run_one(&self, n: u64) {
        info!("===== Cycle {} | {} =====", n, chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));

        // Own task so a panic inside the cycle stays inside the cycle
        let cycle = self.cycle.clone();
        match tokio::spawn(async move { cycle.run_cycle().await }).await {
            Ok(Ok(report)) => {
                info!(
                    "Cycle {} finished ({}): {} listed, {} attempted, {} remaining",
                    n,
                    report.phase(),
                    report.listed,
                    report.attempted,
                    report.remaining
                );
            }
            Ok(Err(e)) => error!("Cycle {} failed: {}", n, e),
            Err(e) => error!("Cycle {} aborted: {}", n, e),
        }
    }
}

async fn stop_requested(rx: &mut watch::Receiver<bool>) {
    // A dropped sender counts as a stop request
    let _ = rx.wait_for(|stop| *stop).await;
}

/// Handle to a running scheduler
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<u64>,
}

impl SchedulerHandle {
    /// Ask the loop to stop after the current cycle
    pub fn request_shutdown(&self) {
        if self.shutdown.send(true).is_err() {
            warn!("Claim scheduler already stopped");
        }
    }

    /// Request shutdown and wait for the loop to exit
    pub async fn shutdown(self) -> u64 {
        self.request_shutdown();
        self.join().await
    }

    /// Wait for the loop to exit on its own
    pub async fn join(self) -> u64 {
        match self.task.await {
            Ok(completed) => completed,
            Err(e) => {
                error!("Claim scheduler task failed: {}", e);
                0
            }
        }
    }
}
