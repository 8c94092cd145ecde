use fence_core::{
    Alert, AlertSeverity, AlertType, Asset, AssetId, EpochMillis, Geofence, GeofenceId,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Severity stamped on every boundary-crossing alert.
pub const TRANSITION_ALERT_SEVERITY: AlertSeverity = AlertSeverity::Medium;

/// Remembers, per asset, which geofences contained it at the last evaluation.
///
/// Each (asset, geofence) pair is a two-state machine starting `Outside`. Only
/// a change of state produces an alert, and only when the geofence asks for
/// that edge. State follows physical containment whether or not an alert was
/// raised.
///
/// Inactive assets and inactive geofences are skipped without touching their
/// stored state, so a geofence that is switched off and back on resumes from
/// the value it had when it was switched off.
#[derive(Debug, Default)]
pub struct ContainmentTracker {
    states: HashMap<AssetId, HashMap<GeofenceId, bool>>,
}

impl ContainmentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one transition check for a single pair.
    pub fn evaluate_pair(
        &mut self,
        asset: &Asset,
        geofence: &Geofence,
        now_ms: EpochMillis,
    ) -> Option<Alert> {
        if !asset.is_active || !geofence.is_active {
            return None;
        }

        let is_inside_now = geofence.polygon.contains(asset.position);
        let containment = self.states.entry(asset.id).or_default();
        let was_inside = containment.get(&geofence.id).copied().unwrap_or(false);
        if is_inside_now == was_inside {
            return None;
        }
        containment.insert(geofence.id, is_inside_now);

        let alert_type = AlertType::for_transition(is_inside_now);
        let wants_alert = match alert_type {
            AlertType::Entry => geofence.alert_on_entry,
            AlertType::Exit => geofence.alert_on_exit,
        };
        debug!(
            asset_id = %asset.id,
            geofence_id = %geofence.id,
            alert_type = alert_type.as_str(),
            alerting = wants_alert,
            "Containment changed"
        );

        wants_alert.then(|| {
            Alert::for_transition(
                asset,
                geofence,
                alert_type,
                TRANSITION_ALERT_SEVERITY,
                now_ms,
            )
        })
    }

    /// Checks one asset against every geofence and returns the alerts raised.
    pub fn evaluate_asset(
        &mut self,
        asset: &Asset,
        geofences: &[Geofence],
        now_ms: EpochMillis,
    ) -> Vec<Alert> {
        if !asset.is_active {
            return Vec::new();
        }
        geofences
            .iter()
            .filter_map(|geofence| self.evaluate_pair(asset, geofence, now_ms))
            .collect()
    }

    pub fn is_inside(&self, asset_id: AssetId, geofence_id: GeofenceId) -> bool {
        self.states
            .get(&asset_id)
            .and_then(|containment| containment.get(&geofence_id))
            .copied()
            .unwrap_or(false)
    }

    pub fn containment(&self, asset_id: AssetId) -> Option<&HashMap<GeofenceId, bool>> {
        self.states.get(&asset_id)
    }

    pub fn tracked_assets(&self) -> usize {
        self.states.len()
    }

    /// Drops state for assets and geofences that no longer exist.
    ///
    /// Inactive but still existing records must be included in the live sets,
    /// otherwise their frozen state is lost. Returns the number of entries
    /// removed.
    pub fn prune(
        &mut self,
        live_assets: &HashSet<AssetId>,
        live_geofences: &HashSet<GeofenceId>,
    ) -> usize {
        let mut removed = 0;
        self.states.retain(|asset_id, containment| {
            if !live_assets.contains(asset_id) {
                removed += containment.len();
                return false;
            }
            let before = containment.len();
            containment.retain(|geofence_id, _| live_geofences.contains(geofence_id));
            removed += before - containment.len();
            true
        });
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fence_core::{AssetDraft, Coordinate, GeofenceDraft, Polygon};

    const INSIDE: Coordinate = Coordinate::new(5.0, 5.0);
    const OUTSIDE: Coordinate = Coordinate::new(15.0, 15.0);

    fn geofence() -> Geofence {
        let square = Polygon::new(vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 10.0),
            Coordinate::new(10.0, 10.0),
            Coordinate::new(10.0, 0.0),
        ]);
        Geofence::from_draft(GeofenceDraft::new("Yard", square), 0).unwrap()
    }

    fn asset_at(position: Coordinate) -> Asset {
        Asset::from_draft(AssetDraft::new("Truck", position), 0).unwrap()
    }

    #[test]
    fn entry_then_exit_fire_once_each() {
        let mut tracker = ContainmentTracker::new();
        let zone = geofence();
        let mut asset = asset_at(OUTSIDE);

        assert!(tracker.evaluate_pair(&asset, &zone, 1).is_none());

        asset.position = INSIDE;
        let entry = tracker.evaluate_pair(&asset, &zone, 2).expect("entry alert");
        assert_eq!(entry.alert_type, AlertType::Entry);
        assert_eq!(entry.severity, AlertSeverity::Medium);
        assert_eq!(entry.position, INSIDE);
        assert_eq!(entry.timestamp_ms, 2);
        assert!(tracker.is_inside(asset.id, zone.id));

        assert!(tracker.evaluate_pair(&asset, &zone, 3).is_none());

        asset.position = OUTSIDE;
        let exit = tracker.evaluate_pair(&asset, &zone, 4).expect("exit alert");
        assert_eq!(exit.alert_type, AlertType::Exit);
        assert_eq!(exit.position, OUTSIDE);
        assert!(!tracker.is_inside(asset.id, zone.id));
    }

    #[test]
    fn first_observation_inside_counts_as_entry() {
        let mut tracker = ContainmentTracker::new();
        let alert = tracker.evaluate_pair(&asset_at(INSIDE), &geofence(), 1);
        assert_eq!(alert.map(|alert| alert.alert_type), Some(AlertType::Entry));
    }

    #[test]
    fn suppressed_entry_still_flips_state() {
        let mut tracker = ContainmentTracker::new();
        let mut zone = geofence();
        zone.alert_on_entry = false;
        let mut asset = asset_at(INSIDE);

        assert!(tracker.evaluate_pair(&asset, &zone, 1).is_none());
        assert!(tracker.is_inside(asset.id, zone.id));

        asset.position = OUTSIDE;
        let exit = tracker.evaluate_pair(&asset, &zone, 2);
        assert_eq!(exit.map(|alert| alert.alert_type), Some(AlertType::Exit));
    }

    #[test]
    fn suppressed_exit_still_flips_state() {
        let mut tracker = ContainmentTracker::new();
        let mut zone = geofence();
        zone.alert_on_exit = false;
        let mut asset = asset_at(INSIDE);

        assert!(tracker.evaluate_pair(&asset, &zone, 1).is_some());
        asset.position = OUTSIDE;
        assert!(tracker.evaluate_pair(&asset, &zone, 2).is_none());
        assert!(!tracker.is_inside(asset.id, zone.id));
    }

    #[test]
    fn inactive_geofence_freezes_state() {
        let mut tracker = ContainmentTracker::new();
        let mut zone = geofence();
        let mut asset = asset_at(INSIDE);
        assert!(tracker.evaluate_pair(&asset, &zone, 1).is_some());

        zone.is_active = false;
        asset.position = OUTSIDE;
        assert!(tracker.evaluate_pair(&asset, &zone, 2).is_none());
        assert!(tracker.is_inside(asset.id, zone.id));

        // Back inside before reactivation: nothing changed from the frozen view.
        asset.position = INSIDE;
        zone.is_active = true;
        assert!(tracker.evaluate_pair(&asset, &zone, 3).is_none());
    }

    #[test]
    fn reactivated_geofence_reports_real_change() {
        let mut tracker = ContainmentTracker::new();
        let mut zone = geofence();
        let mut asset = asset_at(INSIDE);
        tracker.evaluate_pair(&asset, &zone, 1);

        zone.is_active = false;
        asset.position = OUTSIDE;
        tracker.evaluate_pair(&asset, &zone, 2);

        zone.is_active = true;
        let alert = tracker.evaluate_pair(&asset, &zone, 3);
        assert_eq!(alert.map(|alert| alert.alert_type), Some(AlertType::Exit));
    }

    #[test]
    fn inactive_asset_is_not_tracked() {
        let mut tracker = ContainmentTracker::new();
        let mut asset = asset_at(INSIDE);
        asset.is_active = false;
        assert!(tracker.evaluate_asset(&asset, &[geofence()], 1).is_empty());
        assert_eq!(tracker.tracked_assets(), 0);
        assert!(tracker.containment(asset.id).is_none());
    }

    #[test]
    fn evaluate_asset_covers_every_active_geofence() {
        let mut tracker = ContainmentTracker::new();
        let asset = asset_at(INSIDE);
        let first = geofence();
        let second = geofence();
        let mut dormant = geofence();
        dormant.is_active = false;

        let zones = [first.clone(), second.clone(), dormant.clone()];
        let alerts = tracker.evaluate_asset(&asset, &zones, 1);
        assert_eq!(alerts.len(), 2);
        let containment = tracker.containment(asset.id).unwrap();
        assert_eq!(containment.len(), 2);
        assert!(!containment.contains_key(&dormant.id));
    }

    #[test]
    fn prune_drops_deleted_records_only() {
        let mut tracker = ContainmentTracker::new();
        let kept_asset = asset_at(INSIDE);
        let gone_asset = asset_at(INSIDE);
        let kept_zone = geofence();
        let gone_zone = geofence();
        let zones = [kept_zone.clone(), gone_zone.clone()];
        tracker.evaluate_asset(&kept_asset, &zones, 1);
        tracker.evaluate_asset(&gone_asset, &zones, 1);

        let live_assets = HashSet::from([kept_asset.id]);
        let live_zones = HashSet::from([kept_zone.id]);
        assert_eq!(tracker.prune(&live_assets, &live_zones), 3);
        assert_eq!(tracker.tracked_assets(), 1);
        assert!(tracker.is_inside(kept_asset.id, kept_zone.id));
        assert!(!tracker.containment(kept_asset.id).unwrap().contains_key(&gone_zone.id));
    }
}
