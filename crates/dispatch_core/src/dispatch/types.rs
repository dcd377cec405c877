use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::Coord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverId(pub u64);

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "driver-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RideId(pub u64);

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ride-{}", self.0)
    }
}

/// Opaque handle of the client connection a driver registered through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionRef(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriverStatus {
    Idle,
    Busy,
}

/// Attributes consumed by the safety policy and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverAttributes {
    /// Trust category label, e.g. `"verified"` or `"unverified"`.
    pub trust_category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverRegistration {
    #[serde(default)]
    pub session: SessionRef,
    pub location: Coord,
    #[serde(default)]
    pub attributes: DriverAttributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub session: SessionRef,
    pub location: Coord,
    pub status: DriverStatus,
    pub attributes: DriverAttributes,
    pub rating: f64,
    /// Simulation time (ms) the current trip ends. Set while busy.
    pub trip_end_ms: Option<u64>,
    pub trip_end_location: Option<Coord>,
}

impl Driver {
    /// Seconds left on the current trip; `None` if no trip end is known.
    pub fn remaining_trip_secs(&self, now_ms: u64) -> Option<f64> {
        self.trip_end_ms
            .map(|end| end.saturating_sub(now_ms) as f64 / 1_000.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRequest {
    pub pickup: Coord,
    pub dropoff: Coord,
    #[serde(default)]
    pub safety_mode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    /// Driver is still finishing another trip.
    Queued,
    Active,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripAssignment {
    pub ride_id: RideId,
    pub driver_id: DriverId,
    pub driver_rating: f64,
    pub price: f64,
    /// Seconds until the driver reaches pickup.
    pub eta_secs: f64,
    pub passcode: String,
    pub status: TripStatus,
    /// Pickup to dropoff geometry.
    pub route: Vec<Coord>,
    pub trip_distance_m: f64,
    pub trip_duration_secs: f64,
    pub safety_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RideOutcome {
    Assigned(TripAssignment),
    /// No eligible driver. Not an error.
    NotFound,
}

impl RideOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, RideOutcome::Assigned(_))
    }

    pub fn assignment(&self) -> Option<&TripAssignment> {
        match self {
            RideOutcome::Assigned(assignment) => Some(assignment),
            RideOutcome::NotFound => None,
        }
    }
}

/// A driver that passed filtering, with its pickup ETA.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub driver_id: DriverId,
    pub rating: f64,
    pub eta_secs: f64,
    /// Busy driver expected to free up within the horizon.
    pub predictive: bool,
}

/// Roster entry broadcast to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverSnapshot {
    pub id: DriverId,
    pub lat: f64,
    pub lng: f64,
    pub status: DriverStatus,
    pub rating: f64,
}

impl From<&Driver> for DriverSnapshot {
    fn from(driver: &Driver) -> Self {
        Self {
            id: driver.id,
            lat: driver.location.lat,
            lng: driver.location.lng,
            status: driver.status,
            rating: driver.rating,
        }
    }
}
