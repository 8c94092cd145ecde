use fence_config::{ServiceConfig, TrackingConfig};
use fence_core::{AssetDraft, AssetKind, Coordinate, GeofenceDraft, Polygon};
use fence_engine::{admit_geofence, CollisionPolicy, SchedulerConfig, ViolationScheduler};
use fence_observability::{init, log_startup, ObservabilityConfig};
use fence_storage::{AssetRepository, MemoryStore};
use std::sync::Arc;

const DEMO_KINDS: [AssetKind; 3] = [AssetKind::Vehicle, AssetKind::Personnel, AssetKind::Drone];
const DEMO_ZONE_HALF_SPAN_DEG: f64 = 0.002;
const DEMO_ASSET_SPACING_DEG: f64 = 0.0015;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::from_env("fence-worker");
    let tracking = TrackingConfig::from_env();
    let obs_config = ObservabilityConfig {
        service_name: config.service_name.clone(),
        environment: config.environment.to_string(),
        log_level: config.log_level.clone(),
        metrics_addr: config.metrics_addr.clone(),
        region: config.region.clone(),
    };
    let handle = init(&obs_config);
    log_startup(&handle, &obs_config.environment);

    let store = Arc::new(MemoryStore::with_alert_history(tracking.alert_history));
    seed_demo_fleet(&store, &tracking).await?;

    let scheduler = Arc::new(ViolationScheduler::for_store(
        store.clone(),
        SchedulerConfig::from(&tracking),
    ));
    tracing::info!(
        bounds = %tracking.bounds_name,
        motion_interval_ms = tracking.motion_interval_ms,
        evaluation_interval_ms = tracking.evaluation_interval_ms,
        "Scheduler starting"
    );
    let scheduler = scheduler.start();

    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install ctrl-c handler: {}", err);
    }
    tracing::info!("Shutdown requested");
    scheduler.shutdown().await;
    Ok(())
}

/// A square zone around the map center and a short column of assets walking
/// away from it, so entry and exit alerts show up within a few ticks.
async fn seed_demo_fleet(
    store: &MemoryStore,
    tracking: &TrackingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let center = tracking.bounds.center();
    let zone = Polygon::new(vec![
        center.offset(-DEMO_ZONE_HALF_SPAN_DEG, -DEMO_ZONE_HALF_SPAN_DEG),
        center.offset(-DEMO_ZONE_HALF_SPAN_DEG, DEMO_ZONE_HALF_SPAN_DEG),
        center.offset(DEMO_ZONE_HALF_SPAN_DEG, DEMO_ZONE_HALF_SPAN_DEG),
        center.offset(DEMO_ZONE_HALF_SPAN_DEG, -DEMO_ZONE_HALF_SPAN_DEG),
    ]);
    admit_geofence(
        store,
        GeofenceDraft::new("Central Depot", zone),
        CollisionPolicy::Allow,
    )
    .await?;

    for index in 0..tracking.demo_assets {
        let position: Coordinate = tracking
            .bounds
            .clamp(center.offset(index as f64 * DEMO_ASSET_SPACING_DEG, 0.0));
        let mut draft = AssetDraft::new(format!("Unit {}", index + 1), position);
        draft.kind = DEMO_KINDS[index % DEMO_KINDS.len()];
        let asset = AssetRepository::create(store, draft).await?;
        tracing::debug!(asset_id = %asset.id, name = %asset.name, "Seeded demo asset");
    }
    tracing::info!(assets = tracking.demo_assets, "Demo fleet seeded");
    Ok(())
}
