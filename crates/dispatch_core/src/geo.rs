//! Coordinate type and the two distance measures used across the crate.
//!
//! - **Planar distance**: Euclidean distance in raw degrees. Used by the path
//!   planner heuristic and by vehicle interpolation.
//! - **Great-circle distance**: metres on the sphere, computed through
//!   [`h3o::LatLng`]. Used by route estimation.

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lng: f64,
}

impl Coord {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Straight-line distance in coordinate space (degrees, not metres).
    pub fn planar_distance(&self, other: &Coord) -> f64 {
        let dlat = self.lat - other.lat;
        let dlng = self.lng - other.lng;
        (dlat * dlat + dlng * dlng).sqrt()
    }

    /// Move towards `target` by `fraction` of the remaining vector.
    pub fn lerp(&self, target: &Coord, fraction: f64) -> Coord {
        Coord {
            lat: self.lat + (target.lat - self.lat) * fraction,
            lng: self.lng + (target.lng - self.lng) * fraction,
        }
    }

    /// Great-circle distance in metres. `None` when either coordinate is not
    /// a finite lat/lng.
    pub fn haversine_m(&self, other: &Coord) -> Option<f64> {
        let a = h3o::LatLng::new(self.lat, self.lng).ok()?;
        let b = h3o::LatLng::new(other.lat, other.lng).ok()?;
        Some(a.distance_m(b))
    }
}

impl From<(f64, f64)> for Coord {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_distance_is_euclidean() {
        let a = Coord::new(0.0, 0.0);
        let b = Coord::new(3.0, 4.0);
        assert_eq!(a.planar_distance(&b), 5.0);
    }

    #[test]
    fn lerp_moves_fractionally() {
        let a = Coord::new(0.0, 0.0);
        let b = Coord::new(2.0, -4.0);
        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid, Coord::new(1.0, -2.0));
    }

    #[test]
    fn haversine_one_degree_latitude_is_about_111km() {
        let a = Coord::new(0.0, 0.0);
        let b = Coord::new(1.0, 0.0);
        let meters = a.haversine_m(&b).expect("finite coordinates");
        assert!((meters - 111_195.0).abs() < 500.0, "got {meters}");
    }

    #[test]
    fn haversine_rejects_non_finite() {
        let a = Coord::new(f64::NAN, 0.0);
        assert!(a.haversine_m(&Coord::default()).is_none());
    }
}
