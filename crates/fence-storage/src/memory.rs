use crate::{
    AlertRepository, AlertSink, AssetPatch, AssetRepository, AssetUpdate, AssetUpdater,
    FleetSource, GeofencePatch, GeofenceRepository, StorageError,
};
use async_trait::async_trait;
use fence_core::{
    now_epoch_millis, Alert, AlertId, Asset, AssetDraft, AssetId, FenceError, Geofence,
    GeofenceDraft, GeofenceId,
};
use std::collections::VecDeque;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct StoreState {
    assets: Vec<Asset>,
    geofences: Vec<Geofence>,
    alerts: VecDeque<Alert>,
}

/// Process-local store. Listing preserves insertion order, which is also the
/// order collision checks report in.
#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
    alert_history: usize,
}

impl MemoryStore {
    pub const DEFAULT_ALERT_HISTORY: usize = 10;

    pub fn new() -> Self {
        Self::with_alert_history(Self::DEFAULT_ALERT_HISTORY)
    }

    pub fn with_alert_history(alert_history: usize) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            alert_history,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FleetSource for MemoryStore {
    async fn list_assets(&self) -> Result<Vec<Asset>, StorageError> {
        Ok(self.state.read().await.assets.clone())
    }

    async fn list_geofences(&self) -> Result<Vec<Geofence>, StorageError> {
        Ok(self.state.read().await.geofences.clone())
    }
}

#[async_trait]
impl AlertSink for MemoryStore {
    async fn emit_alert(&self, alert: Alert) -> Result<(), StorageError> {
        debug!(
            alert_id = %alert.id,
            asset_id = %alert.asset_id,
            geofence_id = %alert.geofence_id,
            alert_type = alert.alert_type.as_str(),
            "Storing alert"
        );
        let mut state = self.state.write().await;
        state.alerts.push_front(alert);
        state.alerts.truncate(self.alert_history);
        Ok(())
    }
}

#[async_trait]
impl AssetUpdater for MemoryStore {
    async fn apply_asset_update(
        &self,
        asset_id: AssetId,
        update: AssetUpdate,
    ) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        let asset = state
            .assets
            .iter_mut()
            .find(|asset| asset.id == asset_id)
            .ok_or_else(|| StorageError::not_found("asset", asset_id))?;
        asset.position = update.position;
        asset.status = update.status;
        asset.last_update_ms = update.updated_at_ms;
        Ok(())
    }
}

#[async_trait]
impl AssetRepository for MemoryStore {
    async fn get(&self, id: AssetId) -> Result<Option<Asset>, StorageError> {
        let state = self.state.read().await;
        Ok(state.assets.iter().find(|asset| asset.id == id).cloned())
    }

    async fn create(&self, draft: AssetDraft) -> Result<Asset, StorageError> {
        let asset = Asset::from_draft(draft, now_epoch_millis())?;
        self.state.write().await.assets.push(asset.clone());
        Ok(asset)
    }

    async fn upsert(&self, asset: Asset) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        match state.assets.iter_mut().find(|existing| existing.id == asset.id) {
            Some(existing) => *existing = asset,
            None => state.assets.push(asset),
        }
        Ok(())
    }

    async fn update(&self, id: AssetId, patch: AssetPatch) -> Result<Asset, StorageError> {
        if patch.name.as_ref().is_some_and(|name| name.trim().is_empty()) {
            return Err(FenceError::invalid_input("asset name is required").into());
        }
        if patch.position.is_some_and(|position| !position.is_finite()) {
            return Err(FenceError::invalid_input("asset position must be finite").into());
        }

        let mut state = self.state.write().await;
        let asset = state
            .assets
            .iter_mut()
            .find(|asset| asset.id == id)
            .ok_or_else(|| StorageError::not_found("asset", id))?;

        if let Some(name) = patch.name {
            asset.name = name.trim().to_string();
        }
        if let Some(position) = patch.position {
            asset.position = position;
        }
        if let Some(kind) = patch.kind {
            asset.kind = kind;
        }
        if let Some(is_active) = patch.is_active {
            asset.is_active = is_active;
        }
        if let Some(speed) = patch.speed {
            asset.speed = speed;
        }
        if let Some(heading) = patch.heading {
            asset.heading = heading;
        }
        asset.last_update_ms = now_epoch_millis();
        Ok(asset.clone())
    }

    async fn delete(&self, id: AssetId) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        let before = state.assets.len();
        state.assets.retain(|asset| asset.id != id);
        if state.assets.len() == before {
            return Err(StorageError::not_found("asset", id));
        }
        Ok(())
    }
}

#[async_trait]
impl GeofenceRepository for MemoryStore {
    async fn get(&self, id: GeofenceId) -> Result<Option<Geofence>, StorageError> {
        let state = self.state.read().await;
        Ok(state
            .geofences
            .iter()
            .find(|geofence| geofence.id == id)
            .cloned())
    }

    async fn create(&self, draft: GeofenceDraft) -> Result<Geofence, StorageError> {
        let geofence = Geofence::from_draft(draft, now_epoch_millis())?;
        self.state.write().await.geofences.push(geofence.clone());
        Ok(geofence)
    }

    async fn upsert(&self, geofence: Geofence) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        match state
            .geofences
            .iter_mut()
            .find(|existing| existing.id == geofence.id)
        {
            Some(existing) => *existing = geofence,
            None => state.geofences.push(geofence),
        }
        Ok(())
    }

    async fn update(
        &self,
        id: GeofenceId,
        patch: GeofencePatch,
    ) -> Result<Geofence, StorageError> {
        if patch.name.as_ref().is_some_and(|name| name.trim().is_empty()) {
            return Err(FenceError::invalid_input("geofence name is required").into());
        }
        if patch.polygon.as_ref().is_some_and(|polygon| polygon.is_degenerate()) {
            return Err(
                FenceError::invalid_input("geofence polygon needs at least 3 vertices").into(),
            );
        }

        let mut state = self.state.write().await;
        let geofence = state
            .geofences
            .iter_mut()
            .find(|geofence| geofence.id == id)
            .ok_or_else(|| StorageError::not_found("geofence", id))?;

        if let Some(name) = patch.name {
            geofence.name = name.trim().to_string();
        }
        if let Some(polygon) = patch.polygon {
            geofence.polygon = polygon;
        }
        if let Some(description) = patch.description {
            geofence.description = description;
        }
        if let Some(color) = patch.color {
            geofence.color = color;
        }
        if let Some(is_active) = patch.is_active {
            geofence.is_active = is_active;
        }
        if let Some(alert_on_entry) = patch.alert_on_entry {
            geofence.alert_on_entry = alert_on_entry;
        }
        if let Some(alert_on_exit) = patch.alert_on_exit {
            geofence.alert_on_exit = alert_on_exit;
        }
        Ok(geofence.clone())
    }

    async fn delete(&self, id: GeofenceId) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        let before = state.geofences.len();
        state.geofences.retain(|geofence| geofence.id != id);
        if state.geofences.len() == before {
            return Err(StorageError::not_found("geofence", id));
        }
        Ok(())
    }
}

#[async_trait]
impl AlertRepository for MemoryStore {
    async fn list_recent(&self, limit: usize) -> Result<Vec<Alert>, StorageError> {
        let state = self.state.read().await;
        Ok(state.alerts.iter().take(limit).cloned().collect())
    }

    async fn acknowledge(&self, id: AlertId) -> Result<Alert, StorageError> {
        let mut state = self.state.write().await;
        let alert = state
            .alerts
            .iter_mut()
            .find(|alert| alert.id == id)
            .ok_or_else(|| StorageError::not_found("alert", id))?;
        alert.acknowledged = true;
        Ok(alert.clone())
    }
}
