use fence_geo::BoundingBox;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{env, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Local,
    Dev,
    Test,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_env(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "local" => Self::Local,
            "dev" | "development" => Self::Dev,
            "test" | "testing" => Self::Test,
            "staging" => Self::Staging,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Local => "local",
            Self::Dev => "dev",
            Self::Test => "test",
            Self::Staging => "staging",
            Self::Prod => "prod",
        };
        write!(f, "{}", value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub service_name: String,
    pub environment: Environment,
    pub region: Option<String>,
    pub metrics_addr: Option<String>,
    pub log_level: String,
}

impl ServiceConfig {
    pub fn from_env(default_service_name: &str) -> Self {
        Self::from_lookup(default_service_name, |key| env::var(key).ok())
    }

    pub fn from_lookup(
        default_service_name: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        Self {
            service_name: lookup("FENCE_SERVICE_NAME")
                .unwrap_or_else(|| default_service_name.to_string()),
            environment: Environment::from_env(
                &lookup("FENCE_ENV").unwrap_or_else(|| "local".to_string()),
            ),
            region: lookup("FENCE_REGION"),
            metrics_addr: lookup("FENCE_METRICS_ADDR"),
            log_level: lookup("FENCE_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        }
    }
}

/// Knobs for the motion and evaluation loops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    pub motion_interval_ms: u64,
    pub evaluation_interval_ms: u64,
    pub bounds_name: String,
    pub bounds: BoundingBox,
    /// Full width of the uniform jitter window, in degrees, on each axis.
    pub motion_jitter_deg: f64,
    pub motion_skip_probability: f64,
    pub alert_history: usize,
    pub demo_assets: usize,
}

impl TrackingConfig {
    pub const DEFAULT_MOTION_INTERVAL_MS: u64 = 5_000;
    pub const DEFAULT_EVALUATION_INTERVAL_MS: u64 = 2_000;
    pub const DEFAULT_BOUNDS: &'static str = "pune_expanded";
    pub const DEFAULT_MOTION_JITTER_DEG: f64 = 0.0009;
    pub const DEFAULT_MOTION_SKIP_PROBABILITY: f64 = 0.1;
    pub const DEFAULT_ALERT_HISTORY: usize = 10;
    pub const DEFAULT_DEMO_ASSETS: usize = 3;

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let requested_bounds =
            lookup("FENCE_BOUNDS").unwrap_or_else(|| Self::DEFAULT_BOUNDS.to_string());
        let (bounds_name, bounds) = match BoundingBox::preset(&requested_bounds) {
            Some(bounds) => (requested_bounds.to_ascii_lowercase(), bounds),
            None => (Self::DEFAULT_BOUNDS.to_string(), BoundingBox::default()),
        };

        Self {
            motion_interval_ms: parse_or(
                &lookup,
                "FENCE_MOTION_INTERVAL_MS",
                Self::DEFAULT_MOTION_INTERVAL_MS,
            )
            .max(1),
            evaluation_interval_ms: parse_or(
                &lookup,
                "FENCE_EVALUATION_INTERVAL_MS",
                Self::DEFAULT_EVALUATION_INTERVAL_MS,
            )
            .max(1),
            bounds_name,
            bounds,
            motion_jitter_deg: parse_or(
                &lookup,
                "FENCE_MOTION_JITTER_DEG",
                Self::DEFAULT_MOTION_JITTER_DEG,
            )
            .abs(),
            motion_skip_probability: parse_or(
                &lookup,
                "FENCE_MOTION_SKIP_PROBABILITY",
                Self::DEFAULT_MOTION_SKIP_PROBABILITY,
            )
            .clamp(0.0, 1.0),
            alert_history: parse_or(&lookup, "FENCE_ALERT_HISTORY", Self::DEFAULT_ALERT_HISTORY),
            demo_assets: parse_or(&lookup, "FENCE_DEMO_ASSETS", Self::DEFAULT_DEMO_ASSETS),
        }
    }

    pub fn motion_interval(&self) -> Duration {
        Duration::from_millis(self.motion_interval_ms)
    }

    pub fn evaluation_interval(&self) -> Duration {
        Duration::from_millis(self.evaluation_interval_ms)
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(default)
}
