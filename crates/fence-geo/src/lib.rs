//! Planar geometry for city-scale geofencing.
//!
//! Latitude and longitude are treated as plain cartesian axes. This is accurate
//! enough for zones a few kilometres across and keeps every test here cheap.

use serde::{Deserialize, Serialize};

mod polygon;

pub use polygon::{point_in_polygon, polygon_overlap, OverlapEstimate, Polygon};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    pub fn offset(&self, delta_latitude: f64, delta_longitude: f64) -> Self {
        Self::new(
            self.latitude + delta_latitude,
            self.longitude + delta_longitude,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    pub const PUNE_CITY: Self = Self {
        north: 18.5704,
        south: 18.4574,
        east: 73.937,
        west: 73.7874,
    };

    pub const PUNE_CENTRAL: Self = Self {
        north: 18.543,
        south: 18.503,
        east: 73.873,
        west: 73.843,
    };

    pub const PUNE_EXPANDED: Self = Self {
        north: 18.58,
        south: 18.48,
        east: 73.9,
        west: 73.8,
    };

    /// Looks up one of the named map areas. Unknown names return `None`.
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "pune_city" | "pune-city" => Some(Self::PUNE_CITY),
            "pune_central" | "pune-central" => Some(Self::PUNE_CENTRAL),
            "pune_expanded" | "pune-expanded" => Some(Self::PUNE_EXPANDED),
            _ => None,
        }
    }

    pub fn contains(&self, coord: Coordinate) -> bool {
        coord.latitude <= self.north
            && coord.latitude >= self.south
            && coord.longitude <= self.east
            && coord.longitude >= self.west
    }

    /// Pulls a coordinate back onto the nearest edge of the box.
    pub fn clamp(&self, coord: Coordinate) -> Coordinate {
        Coordinate::new(
            coord.latitude.max(self.south).min(self.north),
            coord.longitude.max(self.west).min(self.east),
        )
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::PUNE_EXPANDED
    }
}
