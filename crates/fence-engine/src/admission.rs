use crate::collision::detect_collisions;
use crate::error::EngineError;
use fence_core::{Collision, Geofence, GeofenceDraft};
use fence_storage::{FleetSource, GeofenceRepository};
use tracing::{info, warn};

/// What to do when a new zone overlaps active ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Create the zone anyway and hand the collisions back as a warning.
    #[default]
    Allow,
    /// Refuse to create the zone.
    Reject,
}

#[derive(Debug, Clone)]
pub struct Admission {
    pub geofence: Geofence,
    pub collisions: Vec<Collision>,
}

impl Admission {
    pub fn has_conflicts(&self) -> bool {
        !self.collisions.is_empty()
    }
}

/// Collisions a draft would cause, without creating anything.
pub async fn preview_collisions<S>(
    store: &S,
    draft: &GeofenceDraft,
) -> Result<Vec<Collision>, EngineError>
where
    S: FleetSource,
{
    let existing = store.list_geofences().await?;
    Ok(detect_collisions(draft, &existing))
}

/// Validates a draft, checks it against stored zones and creates it unless the
/// policy forbids the overlaps found.
pub async fn admit_geofence<S>(
    store: &S,
    draft: GeofenceDraft,
    policy: CollisionPolicy,
) -> Result<Admission, EngineError>
where
    S: FleetSource + GeofenceRepository,
{
    draft.validate()?;
    let collisions = preview_collisions(store, &draft).await?;

    if !collisions.is_empty() {
        warn!(
            geofence_name = %draft.name,
            collisions = collisions.len(),
            policy = ?policy,
            "New geofence overlaps active zones"
        );
        if policy == CollisionPolicy::Reject {
            return Err(EngineError::Rejected { collisions });
        }
    }

    let geofence = GeofenceRepository::create(store, draft).await?;
    info!(
        geofence_id = %geofence.id,
        geofence_name = %geofence.name,
        vertices = geofence.polygon.len(),
        "Geofence created"
    );
    Ok(Admission {
        geofence,
        collisions,
    })
}
