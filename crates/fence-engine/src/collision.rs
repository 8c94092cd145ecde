use fence_core::{Collision, CollisionId, CollisionSeverity, Geofence, GeofenceDraft};
use fence_geo::polygon_overlap;

/// Compares a zone that is about to be created against the existing zones.
///
/// Inactive zones are ignored. Results keep the order of `existing`. A draft
/// without an outline collides with nothing.
pub fn detect_collisions(candidate: &GeofenceDraft, existing: &[Geofence]) -> Vec<Collision> {
    let Some(outline) = candidate.polygon.as_ref() else {
        return Vec::new();
    };

    existing
        .iter()
        .filter(|zone| zone.is_active)
        .filter_map(|zone| {
            let overlap = polygon_overlap(&outline.vertices, &zone.polygon.vertices);
            overlap.has_overlap.then(|| Collision {
                id: CollisionId::new(),
                candidate_name: candidate.name.clone(),
                geofence_id: zone.id,
                geofence_name: zone.name.clone(),
                overlap_percent: overlap.overlap_percent,
                severity: CollisionSeverity::from_overlap_percent(overlap.overlap_percent),
            })
        })
        .collect()
}
