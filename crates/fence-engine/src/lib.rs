//! Geofence evaluation: collision checks at zone creation, per-asset
//! containment tracking, and the periodic loops that drive both motion and
//! boundary alerts.

pub mod admission;
pub mod collision;
pub mod error;
pub mod motion;
pub mod scheduler;
pub mod tracker;

pub use admission::{admit_geofence, preview_collisions, Admission, CollisionPolicy};
pub use collision::detect_collisions;
pub use error::EngineError;
pub use motion::MotionSimulator;
pub use scheduler::{
    EvaluationReport, MotionReport, SchedulerConfig, SchedulerHandle, ViolationScheduler,
};
pub use tracker::{ContainmentTracker, TRANSITION_ALERT_SEVERITY};
