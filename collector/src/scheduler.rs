//! Drives the reconciliation engine on a fixed interval, exposes a manual
//! trigger and runs the weekly retention pass.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use tokio::sync::{Mutex, RwLock};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use battletrack_shared::{
    RunResult,
    traits::{RetentionStore, StoreFull, api::UpstreamApiFull},
};

use crate::reconcile::ReconcileEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

/// What a manual trigger got: either the run it executed, or a busy signal
/// because a run was already in flight. Busy never queues a second run.
#[derive(Debug)]
pub enum TriggerOutcome {
    Ran(RunResult),
    Busy,
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub poll_interval: Duration,
    /// Rows older than this are dropped by the retention pass.
    pub retention_window: Duration,
    pub retention_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            retention_window: Duration::from_secs(30 * 24 * 3600),
            retention_interval: Duration::from_secs(7 * 24 * 3600),
        }
    }
}

/// Owns the engine and the single-run lock. Collection and retention both
/// serialize on `run_lock`: they share one storage connection, so the
/// conservative interleaving is the correct one.
pub struct Scheduler<A, S> {
    engine: ReconcileEngine<A, S>,
    config: SchedulerConfig,
    run_lock: Mutex<()>,
    last_run: RwLock<Option<RunResult>>,
}

impl<A, S> Scheduler<A, S>
where
    A: UpstreamApiFull + 'static,
    S: StoreFull + 'static,
{
    pub fn new(engine: ReconcileEngine<A, S>, config: SchedulerConfig) -> Self {
        Self {
            engine,
            config,
            run_lock: Mutex::new(()),
            last_run: RwLock::new(None),
        }
    }

    /// Spawn the collection loop and the retention loop. The returned handle
    /// belongs to the collection loop; both tasks run until the process
    /// exits.
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let retention = self.clone();
        tokio::spawn(async move { retention.retention_loop().await });

        tokio::spawn(async move {
            info!(
                interval_secs = self.config.poll_interval.as_secs(),
                "collection loop started"
            );

            let mut interval = tokio::time::interval(self.config.poll_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if let TriggerOutcome::Busy = self.try_run().await {
                    warn!("previous collection run still in flight, skipping tick");
                }
            }
        })
    }

    /// Run a collection cycle now unless one is already in flight. This is
    /// the single entry point for both the interval timer and manual
    /// triggers.
    pub async fn try_run(&self) -> TriggerOutcome {
        match self.run_lock.try_lock() {
            Ok(_guard) => {
                let result = self.engine.run().await;
                *self.last_run.write().await = Some(result.clone());
                TriggerOutcome::Ran(result)
            }
            Err(_) => TriggerOutcome::Busy,
        }
    }

    /// Idle/Running, derived from the run lock.
    pub fn state(&self) -> SchedulerState {
        match self.run_lock.try_lock() {
            Ok(_) => SchedulerState::Idle,
            Err(_) => SchedulerState::Running,
        }
    }

    pub async fn last_run(&self) -> Option<RunResult> {
        self.last_run.read().await.clone()
    }

    async fn retention_loop(self: Arc<Self>) {
        info!(
            every_secs = self.config.retention_interval.as_secs(),
            window_secs = self.config.retention_window.as_secs(),
            "retention loop started"
        );

        let mut interval = tokio::time::interval(self.config.retention_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; a fresh process has nothing to
        // purge yet.
        interval.tick().await;

        loop {
            interval.tick().await;
            self.run_retention().await;
        }
    }

    /// One retention pass, serialized with collection runs.
    pub async fn run_retention(&self) {
        let _guard = self.run_lock.lock().await;

        let window = TimeDelta::from_std(self.config.retention_window)
            .unwrap_or_else(|_| TimeDelta::days(30));
        let cutoff = Utc::now() - window;

        match self.engine.store().purge_older_than(cutoff).await {
            Ok((matches_deleted, logs_deleted)) => info!(
                matches_deleted,
                logs_deleted,
                cutoff = %cutoff,
                "🧹 retention pass finished"
            ),
            Err(error) => error!(%error, "retention pass failed"),
        }
    }
}
