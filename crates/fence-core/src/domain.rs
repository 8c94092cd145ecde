use crate::error::{FenceError, FenceResult};
use crate::ids::{AlertId, AssetId, CollisionId, GeofenceId};
use crate::time::EpochMillis;
use fence_geo::{Coordinate, Polygon};
use serde::{Deserialize, Serialize};

pub const DEFAULT_GEOFENCE_COLOR: &str = "#FF5722";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Vehicle,
    Personnel,
    Drone,
    Other,
}

impl Default for AssetKind {
    fn default() -> Self {
        Self::Vehicle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    Idle,
    Moving,
}

impl Default for AssetStatus {
    fn default() -> Self {
        Self::Idle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Entry,
    Exit,
}

impl AlertType {
    /// Entering when the asset is now inside, exiting otherwise.
    pub fn for_transition(is_inside_now: bool) -> Self {
        if is_inside_now { Self::Entry } else { Self::Exit }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Exit => "exit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionSeverity {
    Low,
    Medium,
    High,
}

impl CollisionSeverity {
    /// Thresholds: above 50 is high, above 20 is medium, anything else low.
    pub fn from_overlap_percent(percent: u8) -> Self {
        match percent {
            51.. => Self::High,
            21..=50 => Self::Medium,
            _ => Self::Low,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub name: String,
    #[serde(default)]
    pub kind: AssetKind,
    pub position: Coordinate,
    pub is_active: bool,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub heading: f64,
    #[serde(default)]
    pub status: AssetStatus,
    pub last_update_ms: EpochMillis,
}

impl Asset {
    pub fn from_draft(draft: AssetDraft, now_ms: EpochMillis) -> FenceResult<Self> {
        draft.validate()?;
        Ok(Self {
            id: AssetId::new(),
            name: draft.name.trim().to_string(),
            kind: draft.kind,
            position: draft.position,
            is_active: draft.is_active,
            speed: draft.speed,
            heading: draft.heading,
            status: AssetStatus::Idle,
            last_update_ms: now_ms,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetDraft {
    pub name: String,
    #[serde(default)]
    pub kind: AssetKind,
    pub position: Coordinate,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub heading: f64,
}

impl AssetDraft {
    pub fn new(name: impl Into<String>, position: Coordinate) -> Self {
        Self {
            name: name.into(),
            kind: AssetKind::default(),
            position,
            is_active: true,
            speed: 0.0,
            heading: 0.0,
        }
    }

    pub fn validate(&self) -> FenceResult<()> {
        if self.name.trim().is_empty() {
            return Err(FenceError::invalid_input("asset name is required"));
        }
        if !self.position.is_finite() {
            return Err(FenceError::invalid_input("asset position must be finite"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geofence {
    pub id: GeofenceId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub polygon: Polygon,
    #[serde(default = "default_color")]
    pub color: String,
    pub is_active: bool,
    pub alert_on_entry: bool,
    pub alert_on_exit: bool,
    pub created_at_ms: EpochMillis,
}

impl Geofence {
    pub fn from_draft(draft: GeofenceDraft, created_at_ms: EpochMillis) -> FenceResult<Self> {
        draft.validate()?;
        let GeofenceDraft {
            name,
            description,
            polygon,
            color,
            is_active,
            alert_on_entry,
            alert_on_exit,
        } = draft;
        Ok(Self {
            id: GeofenceId::new(),
            name: name.trim().to_string(),
            description,
            polygon: polygon.unwrap_or_default(),
            color,
            is_active,
            alert_on_entry,
            alert_on_exit,
            created_at_ms,
        })
    }
}

/// A zone that has not been stored yet. The polygon is optional while the
/// outline is still being drawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeofenceDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub polygon: Option<Polygon>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "default_true")]
    pub alert_on_entry: bool,
    #[serde(default = "default_true")]
    pub alert_on_exit: bool,
}

impl GeofenceDraft {
    pub fn new(name: impl Into<String>, polygon: Polygon) -> Self {
        Self {
            name: name.into(),
            polygon: Some(polygon),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> FenceResult<()> {
        if self.name.trim().is_empty() {
            return Err(FenceError::invalid_input("geofence name is required"));
        }
        let Some(polygon) = self.polygon.as_ref() else {
            return Err(FenceError::invalid_input("geofence polygon is required"));
        };
        if polygon.is_degenerate() {
            return Err(FenceError::invalid_input(format!(
                "geofence polygon needs at least 3 vertices, got {}",
                polygon.len()
            )));
        }
        if !polygon.vertices.iter().all(Coordinate::is_finite) {
            return Err(FenceError::invalid_input(
                "geofence polygon has non-finite vertices",
            ));
        }
        Ok(())
    }
}

impl Default for GeofenceDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            polygon: None,
            color: default_color(),
            is_active: true,
            alert_on_entry: true,
            alert_on_exit: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub asset_id: AssetId,
    pub asset_name: String,
    pub geofence_id: GeofenceId,
    pub geofence_name: String,
    pub alert_type: AlertType,
    pub timestamp_ms: EpochMillis,
    pub position: Coordinate,
    pub severity: AlertSeverity,
    #[serde(default)]
    pub acknowledged: bool,
}

impl Alert {
    pub fn for_transition(
        asset: &Asset,
        geofence: &Geofence,
        alert_type: AlertType,
        severity: AlertSeverity,
        timestamp_ms: EpochMillis,
    ) -> Self {
        Self {
            id: AlertId::new(),
            asset_id: asset.id,
            asset_name: asset.name.clone(),
            geofence_id: geofence.id,
            geofence_name: geofence.name.clone(),
            alert_type,
            timestamp_ms,
            position: asset.position,
            severity,
            acknowledged: false,
        }
    }
}

/// Overlap between a zone being created and one that already exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collision {
    pub id: CollisionId,
    pub candidate_name: String,
    pub geofence_id: GeofenceId,
    pub geofence_name: String,
    pub overlap_percent: u8,
    pub severity: CollisionSeverity,
}

fn default_true() -> bool {
    true
}

fn default_color() -> String {
    DEFAULT_GEOFENCE_COLOR.to_string()
}
