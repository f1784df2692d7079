//! Rectangular extraction regions.

use serde::{Deserialize, Serialize};

/// A geographic bounding box given as north/south/west/east bounds in degrees.
///
/// Regions come straight from the user's region table and are never
/// mutated. `south < north` and `west < east` are expected but not enforced:
/// an inverted region selects no cells and aggregates to missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    #[serde(rename = "N")]
    pub north: f64,
    #[serde(rename = "S")]
    pub south: f64,
    #[serde(rename = "W")]
    pub west: f64,
    #[serde(rename = "E")]
    pub east: f64,
}

impl Region {
    /// Create a region from its four bounds.
    pub fn new(north: f64, south: f64, west: f64, east: f64) -> Self {
        Self {
            north,
            south,
            west,
            east,
        }
    }

    /// Round every bound to `decimals` places.
    ///
    /// Region tables are typed by hand and often carry noise like
    /// `10.000000001`; extraction works on bounds rounded to 4 places.
    pub fn rounded(&self, decimals: u32) -> Self {
        let factor = 10f64.powi(decimals as i32);
        let round = |v: f64| (v * factor).round() / factor;
        Self {
            north: round(self.north),
            south: round(self.south),
            west: round(self.west),
            east: round(self.east),
        }
    }

    /// True when south < north and west < east.
    pub fn is_well_formed(&self) -> bool {
        self.south < self.north && self.west < self.east
    }

    /// Check if a point is contained within this region (bounds inclusive).
    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        lon >= self.west && lon <= self.east && lat >= self.south && lat <= self.north
    }

    /// Width of the region in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height of the region in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }
}
