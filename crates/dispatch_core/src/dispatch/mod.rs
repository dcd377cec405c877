//! Predictive driver matching.
//!
//! A ride request is matched against every registered driver:
//!
//! 1. In safety mode the [`SafetyPolicy`] removes drivers before scoring.
//! 2. Idle drivers are scored by route duration to pickup. Busy drivers
//!    finishing within the predictive horizon are scored by remaining trip
//!    time plus route duration from their trip end to pickup.
//! 3. The lowest ETA wins. Equal ETAs go to the earliest registered driver.
//! 4. Idle winners become busy with an active assignment; busy winners get a
//!    queued assignment and are otherwise left untouched.
//!
//! Queued assignments are never promoted to active. They are dropped once
//! their driver is released.
//!
//! Each request first releases drivers whose trip has ended, then issues one
//! route query per eligible driver plus one for the trip itself. Route calls
//! are synchronous and run under `&self`.

pub mod repository;
pub mod safety;
pub mod types;

use bevy_ecs::prelude::Resource;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::clock::ONE_SEC_MS;
use crate::pricing::PricingConfig;
use crate::routing::{
    build_route_provider, wrap_route_provider, ResilientRouteProvider, RouteConfig, RouteProvider,
};

pub use repository::{DriverRepository, TripRepository};
pub use safety::{AdmitAll, CategoryRatingPolicy, SafetyConfig, SafetyPolicy};
pub use types::{
    Candidate, Driver, DriverAttributes, DriverId, DriverRegistration, DriverSnapshot,
    DriverStatus, RideId, RideOutcome, RideRequest, SessionRef, TripAssignment, TripStatus,
};

/// Busy drivers finishing within this many seconds are matchable.
pub const PREDICTIVE_HORIZON_SECS: f64 = 5.0 * 60.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub pricing: PricingConfig,
    pub safety: SafetyConfig,
    pub route: RouteConfig,
    pub predictive_horizon_secs: f64,
    /// Initial driver ratings are drawn uniformly from this range.
    pub rating_min: f64,
    pub rating_max: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            pricing: PricingConfig::default(),
            safety: SafetyConfig::default(),
            route: RouteConfig::default(),
            predictive_horizon_secs: PREDICTIVE_HORIZON_SECS,
            rating_min: 4.5,
            rating_max: 5.0,
        }
    }
}

#[derive(Resource)]
pub struct DispatchEngine {
    config: DispatchConfig,
    routes: ResilientRouteProvider,
    safety: Box<dyn SafetyPolicy>,
    drivers: DriverRepository,
    trips: TripRepository,
    rng: StdRng,
}

impl DispatchEngine {
    /// Engine with the straight-line route provider and the category/rating
    /// safety policy described by `config`.
    pub fn new(config: DispatchConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            routes: build_route_provider(&config.route),
            safety: Box::new(CategoryRatingPolicy::from(&config.safety)),
            drivers: DriverRepository::default(),
            trips: TripRepository::default(),
            rng,
            config,
        }
    }

    /// Replace the route backend. The configured cache and fallback still
    /// apply.
    pub fn with_route_provider(mut self, provider: Box<dyn RouteProvider>) -> Self {
        self.routes = wrap_route_provider(provider, &self.config.route);
        self
    }

    pub fn with_safety_policy(mut self, policy: Box<dyn SafetyPolicy>) -> Self {
        self.safety = policy;
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn drivers(&self) -> &DriverRepository {
        &self.drivers
    }

    pub fn driver(&self, id: DriverId) -> Option<&Driver> {
        self.drivers.get(id)
    }

    pub fn assignment(&self, ride_id: RideId) -> Option<&TripAssignment> {
        self.trips.get(ride_id)
    }

    pub fn trips(&self) -> &TripRepository {
        &self.trips
    }

    pub fn register_driver(&mut self, registration: DriverRegistration) -> Driver {
        let (lo, hi) = ordered(self.config.rating_min, self.config.rating_max);
        let rating = self.rng.gen_range(lo..=hi);
        let driver = Driver {
            id: self.drivers.allocate_id(),
            session: registration.session,
            location: registration.location,
            status: DriverStatus::Idle,
            attributes: registration.attributes,
            rating,
            trip_end_ms: None,
            trip_end_location: None,
        };
        info!("registered {} (rating {:.2})", driver.id, driver.rating);
        self.drivers.insert(driver.clone());
        driver
    }

    /// Drivers eligible for `request`, each with its pickup ETA, in driver id
    /// order.
    pub fn candidates(&self, request: &RideRequest, now_ms: u64) -> Vec<Candidate> {
        let horizon = self.config.predictive_horizon_secs;
        self.drivers
            .iter()
            .filter(|driver| !request.safety_mode || self.safety.admits(driver))
            .filter_map(|driver| {
                let candidate = match driver.status {
                    DriverStatus::Idle => Candidate {
                        driver_id: driver.id,
                        rating: driver.rating,
                        eta_secs: self.routes.route(driver.location, request.pickup).duration_secs,
                        predictive: false,
                    },
                    DriverStatus::Busy => {
                        let remaining = driver
                            .remaining_trip_secs(now_ms)
                            .filter(|r| *r < horizon)?;
                        let trip_end = driver.trip_end_location?;
                        let leg = self.routes.route(trip_end, request.pickup).duration_secs;
                        Candidate {
                            driver_id: driver.id,
                            rating: driver.rating,
                            eta_secs: remaining + leg,
                            predictive: true,
                        }
                    }
                };
                debug!(
                    "candidate {} eta {:.1}s{}",
                    candidate.driver_id,
                    candidate.eta_secs,
                    if candidate.predictive { " (predictive)" } else { "" }
                );
                Some(candidate)
            })
            .collect()
    }

    /// Match `request` to the driver with the lowest pickup ETA. Drivers whose
    /// trip has already ended are released first and compete as idle.
    pub fn request_ride(&mut self, request: &RideRequest, now_ms: u64) -> RideOutcome {
        self.complete_due_trips(now_ms);
        let candidates = self.candidates(request, now_ms);
        // min_by keeps the first of several equal minima, i.e. the lowest id.
        let Some(winner) = candidates
            .into_iter()
            .min_by(|a, b| a.eta_secs.total_cmp(&b.eta_secs))
        else {
            info!("no eligible driver for pickup {:?}", request.pickup);
            return RideOutcome::NotFound;
        };

        let trip = self.routes.route(request.pickup, request.dropoff);
        let pricing = &self.config.pricing;
        let price = pricing.trip_fare(trip.distance_m, request.safety_mode);
        let safety_message = request.safety_mode.then(|| {
            format!(
                "Safety mode: {}% surcharge applied. Matched with a driver rated {:.2}.",
                pricing.surcharge_percent(),
                winner.rating
            )
        });

        let status = if winner.predictive {
            TripStatus::Queued
        } else {
            TripStatus::Active
        };
        if status == TripStatus::Active {
            if let Some(driver) = self.drivers.get_mut(winner.driver_id) {
                let trip_ms = ((trip.duration_secs * 1_000.0).round() as u64).max(ONE_SEC_MS);
                driver.status = DriverStatus::Busy;
                driver.trip_end_ms = Some(now_ms.saturating_add(trip_ms));
                driver.trip_end_location = Some(request.dropoff);
            }
        }

        let assignment = TripAssignment {
            ride_id: self.trips.allocate_id(),
            driver_id: winner.driver_id,
            driver_rating: winner.rating,
            price,
            eta_secs: winner.eta_secs,
            passcode: self.generate_passcode(),
            status,
            route: trip.geometry,
            trip_distance_m: trip.distance_m,
            trip_duration_secs: trip.duration_secs,
            safety_message,
        };
        info!(
            "{} assigned to {} ({:?}, eta {:.1}s, price {:.2})",
            assignment.ride_id,
            assignment.driver_id,
            assignment.status,
            assignment.eta_secs,
            assignment.price
        );
        self.trips.insert(assignment.clone());
        RideOutcome::Assigned(assignment)
    }

    /// `true` only for an active assignment with exactly this passcode. A
    /// successful check consumes the assignment.
    pub fn verify_passcode(&mut self, ride_id: RideId, code: &str) -> bool {
        let matches = self
            .trips
            .get(ride_id)
            .is_some_and(|t| t.status == TripStatus::Active && t.passcode == code);
        if matches {
            self.trips.remove(ride_id);
            info!("{ride_id} passcode verified");
        } else {
            debug!("{ride_id} passcode rejected");
        }
        matches
    }

    /// Return busy drivers whose trip has ended to idle at their drop-off and
    /// drop the queued assignments still waiting on them. Returns how many
    /// drivers were released.
    pub fn complete_due_trips(&mut self, now_ms: u64) -> usize {
        let mut released = Vec::new();
        for driver in self.drivers.iter_mut() {
            let due = driver.status == DriverStatus::Busy
                && driver.trip_end_ms.is_some_and(|end| end <= now_ms);
            if !due {
                continue;
            }
            if let Some(location) = driver.trip_end_location.take() {
                driver.location = location;
            }
            driver.status = DriverStatus::Idle;
            driver.trip_end_ms = None;
            released.push(driver.id);
        }
        for id in &released {
            let dropped = self.trips.discard_queued_for(*id);
            debug!("{id} finished its trip; dropped {dropped} queued assignments");
        }
        released.len()
    }

    pub fn roster(&self) -> Vec<DriverSnapshot> {
        self.drivers.iter().map(DriverSnapshot::from).collect()
    }

    fn generate_passcode(&mut self) -> String {
        format!("{:04}", self.rng.gen_range(0..10_000))
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
