//! In-memory repositories for drivers and trips, keyed by stable ids.
//!
//! Both use `BTreeMap` so iteration follows id order, which is also
//! registration order.

use std::collections::BTreeMap;

use super::types::{Driver, DriverId, RideId, TripAssignment, TripStatus};

#[derive(Debug, Default)]
pub struct DriverRepository {
    drivers: BTreeMap<DriverId, Driver>,
    next_id: u64,
}

impl DriverRepository {
    pub fn allocate_id(&mut self) -> DriverId {
        let id = DriverId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, driver: Driver) {
        self.drivers.insert(driver.id, driver);
    }

    pub fn get(&self, id: DriverId) -> Option<&Driver> {
        self.drivers.get(&id)
    }

    pub fn get_mut(&mut self, id: DriverId) -> Option<&mut Driver> {
        self.drivers.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Driver> {
        self.drivers.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Driver> {
        self.drivers.values_mut()
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct TripRepository {
    trips: BTreeMap<RideId, TripAssignment>,
    next_id: u64,
}

impl TripRepository {
    pub fn allocate_id(&mut self) -> RideId {
        let id = RideId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, assignment: TripAssignment) {
        self.trips.insert(assignment.ride_id, assignment);
    }

    pub fn get(&self, id: RideId) -> Option<&TripAssignment> {
        self.trips.get(&id)
    }

    pub fn remove(&mut self, id: RideId) -> Option<TripAssignment> {
        self.trips.remove(&id)
    }

    /// Remove the queued assignments of `driver`. Returns how many were removed.
    pub fn discard_queued_for(&mut self, driver: DriverId) -> usize {
        let before = self.trips.len();
        self.trips
            .retain(|_, t| !(t.driver_id == driver && t.status == TripStatus::Queued));
        before - self.trips.len()
    }

    pub fn count_with_status(&self, status: TripStatus) -> usize {
        self.trips.values().filter(|t| t.status == status).count()
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}
