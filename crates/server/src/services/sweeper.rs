//! Expiry sweeper.
//!
//! Periodically migrates every cart older than `stale_after` into order
//! history. Sweeps never overlap: a tick that fires while the previous sweep
//! is still running is skipped. Each stale cart is migrated independently, so
//! one failure never stops the rest of the sweep.
//!
//! The periodic task is owned through a [`SweeperHandle`]; tests drive single
//! sweeps with [`ExpirySweeper::sweep_at`] instead of waiting on the clock.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument, warn};

use super::{CartError, MigrationService};
use crate::db::RecordStore;

/// Default time between sweeps.
pub const DEFAULT_SWEEP_PERIOD: Duration = Duration::from_secs(60);

/// Default cart age after which it is migrated.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(5 * 60);

/// Sweeper timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfig {
    /// Time between sweeps.
    pub period: Duration,
    /// Carts created more than this long ago are stale.
    pub stale_after: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_SWEEP_PERIOD,
            stale_after: DEFAULT_STALE_AFTER,
        }
    }
}

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Carts found older than the cutoff.
    pub stale: usize,
    /// Carts moved into order history by this sweep.
    pub migrated: usize,
    /// Carts a concurrent caller migrated or deleted first.
    pub already_processed: usize,
    /// Carts whose migration failed.
    pub failed: usize,
    /// Carts left untouched because shutdown was requested mid-sweep.
    pub abandoned: usize,
    /// The sweep did not run because another one was in progress.
    pub skipped: bool,
}

/// Migrates stale carts on a fixed period.
pub struct ExpirySweeper {
    store: Arc<dyn RecordStore>,
    migration: MigrationService,
    config: SweepConfig,
    running: Mutex<()>,
}

impl ExpirySweeper {
    /// Create a sweeper over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, config: SweepConfig) -> Self {
        Self {
            migration: MigrationService::new(Arc::clone(&store)),
            store,
            config,
            running: Mutex::new(()),
        }
    }

    /// The timing this sweeper was built with.
    #[must_use]
    pub const fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Run one sweep against the current time.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the stale carts could not be listed.
    /// Per-cart failures are counted in the report, not returned.
    pub async fn sweep(&self) -> Result<SweepReport, CartError> {
        self.sweep_at(Utc::now()).await
    }

    /// Run one sweep as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the stale carts could not be listed.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<SweepReport, CartError> {
        self.run(now, None).await
    }

    /// Spawn the periodic sweep task.
    ///
    /// The first sweep runs immediately, which picks up carts left over from
    /// before a restart.
    #[must_use]
    pub fn start(self: Arc<Self>) -> SweeperHandle {
        let (shutdown, receiver) = watch::channel(false);
        let task = tokio::spawn(async move { self.run_periodic(receiver).await });
        SweeperHandle { shutdown, task }
    }

    fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        TimeDelta::from_std(self.config.stale_after)
            .ok()
            .and_then(|age| now.checked_sub_signed(age))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    #[instrument(skip_all, fields(now = %now))]
    async fn run(
        &self,
        now: DateTime<Utc>,
        shutdown: Option<&watch::Receiver<bool>>,
    ) -> Result<SweepReport, CartError> {
        let Ok(_guard) = self.running.try_lock() else {
            debug!("Previous sweep still running, skipping");
            return Ok(SweepReport {
                skipped: true,
                ..SweepReport::default()
            });
        };

        let stale = self.store.cart_ids_created_before(self.cutoff(now)).await?;
        let mut report = SweepReport {
            stale: stale.len(),
            ..SweepReport::default()
        };

        for (index, &id) in stale.iter().enumerate() {
            if shutdown.is_some_and(|rx| *rx.borrow()) {
                report.abandoned = stale.len() - index;
                info!(abandoned = report.abandoned, "Shutdown requested, ending sweep early");
                break;
            }

            match self.migration.migrate(id).await {
                Ok(_) => report.migrated += 1,
                Err(CartError::AlreadyProcessed(_) | CartError::NotFound(_)) => {
                    report.already_processed += 1;
                }
                Err(e) => {
                    report.failed += 1;
                    if !e.is_data_loss() {
                        warn!(cart_id = %id, error = %e, "Failed to migrate stale cart");
                    }
                }
            }
        }

        if report.stale > 0 {
            info!(
                stale = report.stale,
                migrated = report.migrated,
                already_processed = report.already_processed,
                failed = report.failed,
                abandoned = report.abandoned,
                "Sweep complete"
            );
        }

        Ok(report)
    }

    async fn run_periodic(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.period.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            period_secs = self.config.period.as_secs(),
            stale_after_secs = self.config.stale_after.as_secs(),
            "Expiry sweeper started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            if *shutdown.borrow() {
                break;
            }

            if let Err(e) = self.run(Utc::now(), Some(&shutdown)).await {
                error!(error = %e, "Sweep failed to list stale carts");
            }
        }

        info!("Expiry sweeper stopped");
    }
}

/// Owner of a running sweep task.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Whether the sweep task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal shutdown and wait for the task to exit.
    ///
    /// A migration already in progress completes; carts not yet reached in
    /// the current sweep are left for the next start.
    pub async fn stop(self) {
        // Fails only if the task already exited and dropped its receiver.
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "Expiry sweeper task ended abnormally");
        }
    }
}
