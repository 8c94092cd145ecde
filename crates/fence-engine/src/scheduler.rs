use crate::error::EngineError;
use crate::motion::MotionSimulator;
use crate::tracker::ContainmentTracker;
use fence_config::TrackingConfig;
use fence_core::{millis_since, now_epoch_millis, AssetId, AssetStatus, BoundingBox, GeofenceId};
use fence_storage::{AlertSink, AssetUpdate, AssetUpdater, FleetSource};
use metrics::{counter, gauge};
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub motion_interval: Duration,
    pub evaluation_interval: Duration,
    pub bounds: BoundingBox,
    pub motion_jitter_deg: f64,
    pub motion_skip_probability: f64,
}

impl From<&TrackingConfig> for SchedulerConfig {
    fn from(config: &TrackingConfig) -> Self {
        Self {
            motion_interval: config.motion_interval(),
            evaluation_interval: config.evaluation_interval(),
            bounds: config.bounds,
            motion_jitter_deg: config.motion_jitter_deg,
            motion_skip_probability: config.motion_skip_probability,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from(&TrackingConfig::default())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationReport {
    pub assets_evaluated: usize,
    pub alerts_emitted: usize,
    pub alert_failures: usize,
    pub pruned_entries: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionReport {
    pub assets_moved: usize,
    pub assets_skipped: usize,
    pub update_failures: usize,
}

/// Drives the two periodic loops: simulated motion and violation evaluation.
///
/// Evaluation ticks are serialized through the tracker lock, so at most one
/// evaluation is in flight for any asset. Motion ticks do not take that lock;
/// an evaluation may see a position up to one motion period old.
pub struct ViolationScheduler {
    source: Arc<dyn FleetSource>,
    sink: Arc<dyn AlertSink>,
    updater: Arc<dyn AssetUpdater>,
    tracker: Arc<Mutex<ContainmentTracker>>,
    simulator: std::sync::Mutex<MotionSimulator>,
    config: SchedulerConfig,
}

impl ViolationScheduler {
    pub fn new(
        source: Arc<dyn FleetSource>,
        sink: Arc<dyn AlertSink>,
        updater: Arc<dyn AssetUpdater>,
        config: SchedulerConfig,
    ) -> Self {
        let simulator = MotionSimulator::new(
            config.bounds,
            config.motion_jitter_deg,
            config.motion_skip_probability,
        );
        Self {
            source,
            sink,
            updater,
            tracker: Arc::new(Mutex::new(ContainmentTracker::new())),
            simulator: std::sync::Mutex::new(simulator),
            config,
        }
    }

    /// Uses one store for listing, alert delivery and position updates.
    pub fn for_store<S>(store: Arc<S>, config: SchedulerConfig) -> Self
    where
        S: FleetSource + AlertSink + AssetUpdater + 'static,
    {
        Self::new(store.clone(), store.clone(), store, config)
    }

    pub fn with_simulator(mut self, simulator: MotionSimulator) -> Self {
        self.simulator = std::sync::Mutex::new(simulator);
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn tracker(&self) -> Arc<Mutex<ContainmentTracker>> {
        self.tracker.clone()
    }

    /// One pass of every active asset against every active geofence.
    ///
    /// Sink failures are logged and counted; they neither stop the pass nor
    /// undo the containment change that produced the alert. A listing failure
    /// ends the tick early and leaves all state untouched.
    pub async fn run_evaluation_tick(&self) -> Result<EvaluationReport, EngineError> {
        let mut tracker = self.tracker.lock().await;
        let assets = self.source.list_assets().await?;
        let geofences = self.source.list_geofences().await?;
        let now_ms = now_epoch_millis();
        let mut report = EvaluationReport::default();

        for asset in assets.iter().filter(|asset| asset.is_active) {
            report.assets_evaluated += 1;
            for alert in tracker.evaluate_asset(asset, &geofences, now_ms) {
                let alert_type = alert.alert_type;
                let geofence_id = alert.geofence_id;
                match self.sink.emit_alert(alert).await {
                    Ok(()) => {
                        report.alerts_emitted += 1;
                        counter!("fence_alerts_emitted_total", "alert_type" => alert_type.as_str())
                            .increment(1);
                        info!(
                            asset_id = %asset.id,
                            asset_name = %asset.name,
                            geofence_id = %geofence_id,
                            alert_type = alert_type.as_str(),
                            "Geofence alert raised"
                        );
                    }
                    Err(err) => {
                        report.alert_failures += 1;
                        counter!("fence_alert_failures_total").increment(1);
                        warn!(
                            asset_id = %asset.id,
                            geofence_id = %geofence_id,
                            alert_type = alert_type.as_str(),
                            error = %err,
                            "Failed to emit geofence alert"
                        );
                    }
                }
            }
        }

        let live_assets: HashSet<AssetId> = assets.iter().map(|asset| asset.id).collect();
        let live_geofences: HashSet<GeofenceId> =
            geofences.iter().map(|geofence| geofence.id).collect();
        report.pruned_entries = tracker.prune(&live_assets, &live_geofences);

        gauge!("fence_tracked_assets").set(tracker.tracked_assets() as f64);
        counter!("fence_evaluation_ticks_total").increment(1);
        Ok(report)
    }

    /// Moves every active asset one random step and writes the result back.
    ///
    /// Steps are planned from one listing and written as absolute positions.
    /// An asset moved by hand or deactivated after the listing is still
    /// overwritten with its planned position.
    pub async fn run_motion_tick(&self) -> Result<MotionReport, EngineError> {
        let assets = self.source.list_active_assets().await?;
        let planned: Vec<_> = {
            let mut simulator = self
                .simulator
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            assets
                .iter()
                .map(|asset| {
                    (
                        asset.id,
                        asset.last_update_ms,
                        simulator.next_position(asset.position),
                    )
                })
                .collect()
        };

        let now_ms = now_epoch_millis();
        let mut report = MotionReport::default();
        for (asset_id, last_update_ms, next) in planned {
            let Some(position) = next else {
                report.assets_skipped += 1;
                debug!(
                    asset_id = %asset_id,
                    silent_ms = millis_since(last_update_ms, now_ms),
                    "No position reported this tick"
                );
                continue;
            };
            let update = AssetUpdate {
                position,
                status: AssetStatus::Moving,
                updated_at_ms: now_ms,
            };
            match self.updater.apply_asset_update(asset_id, update).await {
                Ok(()) => report.assets_moved += 1,
                Err(err) => {
                    report.update_failures += 1;
                    counter!("fence_asset_update_failures_total").increment(1);
                    warn!(
                        asset_id = %asset_id,
                        error = %err,
                        "Failed to apply simulated position"
                    );
                }
            }
        }

        counter!("fence_motion_ticks_total").increment(1);
        Ok(report)
    }

    /// Spawns both loops on the current tokio runtime.
    ///
    /// The first tick of each loop fires one full period after start.
    pub fn start(self: Arc<Self>) -> SchedulerHandle {
        let token = CancellationToken::new();

        let motion = {
            let scheduler = self.clone();
            tokio::spawn(run_every(
                self.config.motion_interval,
                token.child_token(),
                "motion",
                move || {
                    let scheduler = scheduler.clone();
                    async move {
                        if let Err(err) = scheduler.run_motion_tick().await {
                            warn!(error = %err, "Motion simulation tick failed");
                        }
                    }
                },
            ))
        };

        let evaluation = {
            let scheduler = self.clone();
            tokio::spawn(run_every(
                self.config.evaluation_interval,
                token.child_token(),
                "evaluation",
                move || {
                    let scheduler = scheduler.clone();
                    async move {
                        if let Err(err) = scheduler.run_evaluation_tick().await {
                            warn!(error = %err, "Violation evaluation tick failed");
                        }
                    }
                },
            ))
        };

        info!(
            motion_interval_ms = self.config.motion_interval.as_millis() as u64,
            evaluation_interval_ms = self.config.evaluation_interval.as_millis() as u64,
            "Violation scheduler started"
        );

        SchedulerHandle {
            token,
            tasks: vec![motion, evaluation],
        }
    }
}

async fn run_every<F, Fut>(
    period: Duration,
    token: CancellationToken,
    name: &'static str,
    mut tick: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let period = period.max(MIN_PERIOD);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => tick().await,
        }
    }
    debug!(task = name, "Periodic task stopped");
}

/// Owns the running loops. Dropping the handle cancels them without waiting;
/// [`SchedulerHandle::shutdown`] cancels and waits.
pub struct SchedulerHandle {
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled() && self.tasks.iter().any(|task| !task.is_finished())
    }

    pub async fn shutdown(mut self) {
        self.token.cancel();
        for task in std::mem::take(&mut self.tasks) {
            if let Err(err) = task.await {
                warn!(error = %err, "Scheduler task ended abnormally");
            }
        }
        info!("Violation scheduler stopped");
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
