use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub service_name: String,
    pub environment: String,
    pub log_level: String,
    pub metrics_addr: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ObservabilityHandle {
    pub service_name: String,
    pub metrics_enabled: bool,
}

pub fn init(config: &ObservabilityConfig) -> ObservabilityHandle {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);

    let metrics_enabled = init_metrics(config);

    ObservabilityHandle {
        service_name: config.service_name.clone(),
        metrics_enabled,
    }
}

pub fn log_startup(handle: &ObservabilityHandle, environment: &str) {
    tracing::info!(
        service = %handle.service_name,
        environment = %environment,
        metrics_enabled = handle.metrics_enabled,
        "Geofence service starting"
    );
}

fn init_metrics(config: &ObservabilityConfig) -> bool {
    let Some(addr) = config.metrics_addr.as_ref() else {
        return false;
    };
    let addr: SocketAddr = match addr.parse() {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!(
                service = %config.service_name,
                error = %err,
                "Invalid FENCE_METRICS_ADDR value"
            );
            return false;
        }
    };

    let mut builder = PrometheusBuilder::new().with_http_listener(addr);
    for (key, value) in global_labels(config) {
        builder = builder.add_global_label(key, value);
    }

    match builder.install() {
        Ok(()) => {
            describe_metrics();
            true
        }
        Err(err) => {
            tracing::warn!(
                service = %config.service_name,
                error = %err,
                "Failed to initialize Prometheus exporter"
            );
            false
        }
    }
}

/// Labels stamped on every exported series. Region is only set when configured.
fn global_labels(config: &ObservabilityConfig) -> Vec<(&'static str, String)> {
    let mut labels = vec![
        ("service", config.service_name.clone()),
        ("environment", config.environment.clone()),
    ];
    if let Some(region) = config.region.as_ref() {
        labels.push(("region", region.clone()));
    }
    labels
}

fn describe_metrics() {
    metrics::describe_counter!(
        "fence_evaluation_ticks_total",
        "Completed violation evaluation ticks"
    );
    metrics::describe_counter!("fence_motion_ticks_total", "Completed motion simulation ticks");
    metrics::describe_counter!(
        "fence_alerts_emitted_total",
        "Boundary crossing alerts delivered to the sink"
    );
    metrics::describe_counter!(
        "fence_alert_failures_total",
        "Alerts the sink refused or failed to store"
    );
    metrics::describe_counter!(
        "fence_asset_update_failures_total",
        "Simulated position updates that could not be written"
    );
    metrics::describe_gauge!(
        "fence_tracked_assets",
        "Assets with containment state held by the tracker"
    );
}
