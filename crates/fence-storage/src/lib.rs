use async_trait::async_trait;
use fence_core::{
    Alert, AlertId, Asset, AssetDraft, AssetId, AssetKind, AssetStatus, Coordinate, EpochMillis,
    ErrorCode, FenceError, Geofence, GeofenceDraft, GeofenceId, Polygon,
};
use serde::{Deserialize, Serialize};
use std::fmt;

mod memory;

pub use memory::MemoryStore;

#[derive(Debug, Clone)]
pub struct StorageError {
    pub code: ErrorCode,
    pub message: String,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::Unavailable, message)
    }

    pub fn with_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(kind: &str, id: impl fmt::Display) -> Self {
        Self::with_code(ErrorCode::NotFound, format!("{kind} {id} not found"))
    }

    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StorageError {}

impl From<FenceError> for StorageError {
    fn from(err: FenceError) -> Self {
        Self::with_code(err.code, err.message)
    }
}

/// Position written back by the motion simulator (or a real telemetry feed).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetUpdate {
    pub position: Coordinate,
    pub status: AssetStatus,
    pub updated_at_ms: EpochMillis,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetPatch {
    pub name: Option<String>,
    pub kind: Option<AssetKind>,
    pub position: Option<Coordinate>,
    pub is_active: Option<bool>,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeofencePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub polygon: Option<Polygon>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
    pub alert_on_entry: Option<bool>,
    pub alert_on_exit: Option<bool>,
}

/// Read side consumed by the evaluation loops.
#[async_trait]
pub trait FleetSource: Send + Sync {
    async fn list_assets(&self) -> Result<Vec<Asset>, StorageError>;
    async fn list_geofences(&self) -> Result<Vec<Geofence>, StorageError>;

    async fn list_active_assets(&self) -> Result<Vec<Asset>, StorageError> {
        let mut assets = self.list_assets().await?;
        assets.retain(|asset| asset.is_active);
        Ok(assets)
    }

    async fn list_active_geofences(&self) -> Result<Vec<Geofence>, StorageError> {
        let mut geofences = self.list_geofences().await?;
        geofences.retain(|geofence| geofence.is_active);
        Ok(geofences)
    }
}

#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn emit_alert(&self, alert: Alert) -> Result<(), StorageError>;
}

#[async_trait]
pub trait AssetUpdater: Send + Sync {
    async fn apply_asset_update(
        &self,
        asset_id: AssetId,
        update: AssetUpdate,
    ) -> Result<(), StorageError>;
}

#[async_trait]
pub trait AssetRepository: Send + Sync {
    async fn get(&self, id: AssetId) -> Result<Option<Asset>, StorageError>;
    async fn create(&self, draft: AssetDraft) -> Result<Asset, StorageError>;
    async fn upsert(&self, asset: Asset) -> Result<(), StorageError>;
    async fn update(&self, id: AssetId, patch: AssetPatch) -> Result<Asset, StorageError>;
    async fn delete(&self, id: AssetId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait GeofenceRepository: Send + Sync {
    async fn get(&self, id: GeofenceId) -> Result<Option<Geofence>, StorageError>;
    async fn create(&self, draft: GeofenceDraft) -> Result<Geofence, StorageError>;
    async fn upsert(&self, geofence: Geofence) -> Result<(), StorageError>;
    async fn update(&self, id: GeofenceId, patch: GeofencePatch)
        -> Result<Geofence, StorageError>;
    async fn delete(&self, id: GeofenceId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait AlertRepository: Send + Sync {
    /// Newest first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<Alert>, StorageError>;
    async fn acknowledge(&self, id: AlertId) -> Result<Alert, StorageError>;
}
