use fence_core::{BoundingBox, Coordinate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random-walk stand-in for a telemetry feed.
///
/// Each step moves a position by a uniform offset in `[-jitter/2, jitter/2)` on
/// both axes and clamps it to the bounding box. With `skip_probability` the
/// step reports nothing, like a tracker that missed a check-in.
#[derive(Debug)]
pub struct MotionSimulator<R = StdRng> {
    bounds: BoundingBox,
    jitter_deg: f64,
    skip_probability: f64,
    rng: R,
}

impl MotionSimulator<StdRng> {
    pub fn new(bounds: BoundingBox, jitter_deg: f64, skip_probability: f64) -> Self {
        Self::with_rng(bounds, jitter_deg, skip_probability, StdRng::from_os_rng())
    }

    pub fn seeded(bounds: BoundingBox, jitter_deg: f64, skip_probability: f64, seed: u64) -> Self {
        Self::with_rng(
            bounds,
            jitter_deg,
            skip_probability,
            StdRng::seed_from_u64(seed),
        )
    }
}

impl<R: Rng> MotionSimulator<R> {
    pub fn with_rng(bounds: BoundingBox, jitter_deg: f64, skip_probability: f64, rng: R) -> Self {
        Self {
            bounds,
            jitter_deg: if jitter_deg.is_finite() { jitter_deg.abs() } else { 0.0 },
            // random_bool panics outside [0, 1], NaN included.
            skip_probability: if skip_probability.is_nan() {
                0.0
            } else {
                skip_probability.clamp(0.0, 1.0)
            },
            rng,
        }
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Next reported position, or `None` when this step is skipped.
    pub fn next_position(&mut self, current: Coordinate) -> Option<Coordinate> {
        if self.rng.random_bool(self.skip_probability) {
            return None;
        }
        Some(self.jitter(current))
    }

    pub fn jitter(&mut self, current: Coordinate) -> Coordinate {
        let delta_latitude = (self.rng.random::<f64>() - 0.5) * self.jitter_deg;
        let delta_longitude = (self.rng.random::<f64>() - 0.5) * self.jitter_deg;
        self.bounds.clamp(current.offset(delta_latitude, delta_longitude))
    }
}
