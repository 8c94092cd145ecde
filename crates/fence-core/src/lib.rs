pub mod domain;
pub mod error;
pub mod ids;
pub mod time;

pub use domain::{
    Alert, AlertSeverity, AlertType, Asset, AssetDraft, AssetKind, AssetStatus, Collision,
    CollisionSeverity, Geofence, GeofenceDraft, DEFAULT_GEOFENCE_COLOR,
};
pub use error::{ErrorCode, FenceError, FenceResult};
pub use ids::{AlertId, AssetId, CollisionId, GeofenceId};
pub use time::{millis_since, now_epoch_millis, EpochMillis};

pub use fence_geo::{BoundingBox, Coordinate, Polygon};
