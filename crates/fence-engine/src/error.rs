use fence_core::{Collision, FenceError};
use fence_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("invalid geofence: {0}")]
    Invalid(#[from] FenceError),
    #[error("geofence overlaps {} active zone(s)", .collisions.len())]
    Rejected { collisions: Vec<Collision> },
}
