//! Background scheduling loop that drives the evaluator.
//!
//! The evaluator itself is synchronous and stateless between ticks;
//! this module owns the cadence. Ticks never overlap: a tick runs to
//! completion (database and location I/O included) before the next one
//! is scheduled, and a slow tick delays rather than bursts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::evaluator::AttendanceEvaluator;
use crate::geo::GeoProvider;
use crate::notify::Notifier;
use crate::storage::{Database, TrackerConfig};

/// Everything one tracking session owns. Moves into the spawned task.
pub struct SessionContext {
    pub db: Database,
    pub geo: Box<dyn GeoProvider>,
    pub notifier: Box<dyn Notifier>,
    pub evaluator: AttendanceEvaluator,
}

pub struct AttendanceScheduler {
    interval: Duration,
}

impl AttendanceScheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_config(cfg: &TrackerConfig) -> Self {
        Self::new(Duration::from_secs(cfg.check_interval_secs.max(1)))
    }

    /// Spawn the tick loop on the current multi-thread runtime.
    ///
    /// The first tick fires immediately so a session started mid-slot
    /// catches up without waiting a full interval.
    pub fn spawn(self, ctx: SessionContext) -> SchedulerHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let ticks = Arc::new(AtomicU64::new(0));
        let tick_counter = Arc::clone(&ticks);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        // rusqlite and the location fetch both block.
                        let result = tokio::task::block_in_place(|| {
                            ctx.evaluator.evaluate_tick(
                                Local::now().naive_local(),
                                &ctx.db,
                                ctx.geo.as_ref(),
                                ctx.notifier.as_ref(),
                            )
                        });
                        tick_counter.fetch_add(1, Ordering::Relaxed);
                        match result {
                            Ok(report) => {
                                log::debug!(
                                    "tick: {} slot(s), {} event(s), {} error(s)",
                                    report.slots_considered,
                                    report.events.len(),
                                    report.slot_errors.len()
                                );
                            }
                            Err(e) => log::error!("tick failed: {e}"),
                        }
                    }
                    _ = stop_rx.changed() => break,
                }
            }
        });

        SchedulerHandle {
            stop_tx,
            task,
            ticks,
        }
    }
}

/// Handle to a running scheduler. Dropping it without calling `stop`
/// leaves the loop running for the lifetime of the runtime.
pub struct SchedulerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
    ticks: Arc<AtomicU64>,
}

impl SchedulerHandle {
    /// Completed tick count since the session started.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Signal the loop to stop and wait for any in-flight tick to
    /// finish.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        let _ = self.task.await;
    }
}
