//! Test helpers for common test setup and utilities.
//!
//! Shared fixtures for unit tests, integration tests and benches.

use bevy_ecs::prelude::World;

use crate::clock::SimulationClock;
use crate::dispatch::{DispatchConfig, DispatchEngine, DriverAttributes, DriverRegistration};
use crate::geo::Coord;
use crate::graph::{NodeId, RoadGraph, CLEAR_WEIGHT};
use crate::messages::Outbox;
use crate::routing::{RouteError, RouteProvider, RouteResult};
use crate::scenario::TickConfig;
use crate::simulator::VehicleSimulator;

/// Route provider answering every query with the same duration and distance.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedRouteProvider {
    pub duration_secs: f64,
    pub distance_m: f64,
}

impl RouteProvider for ScriptedRouteProvider {
    fn route(&self, from: Coord, to: Coord) -> Result<RouteResult, RouteError> {
        Ok(RouteResult {
            duration_secs: self.duration_secs,
            distance_m: self.distance_m,
            geometry: vec![from, to],
        })
    }
}

/// Route provider that always fails, for exercising fallbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingRouteProvider;

impl RouteProvider for FailingRouteProvider {
    fn route(&self, _from: Coord, _to: Coord) -> Result<RouteResult, RouteError> {
        Err(RouteError::Unavailable("backend offline".to_string()))
    }
}

/// Two nodes `n0` and `n1`, one degree of longitude apart, joined by a clear
/// two-way road.
///
/// # Panics
///
/// Panics if the edge cannot be added (should never happen).
pub fn two_node_graph() -> RoadGraph {
    line_graph(2)
}

/// `n` nodes in a west-to-east line, one degree apart, each joined to the
/// next by a clear two-way road.
///
/// # Panics
///
/// Panics if an edge cannot be added (should never happen).
pub fn line_graph(n: u32) -> RoadGraph {
    let mut graph = RoadGraph::new();
    for i in 0..n {
        graph.add_node(NodeId(i), Coord::new(0.0, f64::from(i)));
    }
    for i in 1..n {
        for (a, b) in [(i - 1, i), (i, i - 1)] {
            graph
                .add_edge(NodeId(a), NodeId(b), CLEAR_WEIGHT)
                .expect("line nodes exist");
        }
    }
    graph
}

/// Registration for a driver at `location` with no trust category.
pub fn registration_at(location: Coord) -> DriverRegistration {
    DriverRegistration {
        session: Default::default(),
        location,
        attributes: DriverAttributes::default(),
    }
}

/// Registration for a driver carrying `category` as its trust label.
pub fn registration_with_category(location: Coord, category: &str) -> DriverRegistration {
    DriverRegistration {
        session: Default::default(),
        location,
        attributes: DriverAttributes {
            trust_category: Some(category.to_string()),
        },
    }
}

/// Create a basic test world with every resource the systems read, an empty
/// fleet and `graph` as the road network.
///
/// For full cities use [`crate::scenario::build_scenario`].
pub fn create_test_world(graph: RoadGraph) -> World {
    let mut world = World::new();
    world.insert_resource(graph);
    world.insert_resource(SimulationClock::default());
    world.insert_resource(Outbox::default());
    world.insert_resource(TickConfig::default());
    world.insert_resource(VehicleSimulator::new(Some(1)));
    world.insert_resource(DispatchEngine::new(DispatchConfig::default(), Some(2)));
    world
}
