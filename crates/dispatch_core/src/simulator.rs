//! Vehicle simulator: moves vehicles along planned paths one tick at a time.
//!
//! Each vehicle is either idle or moving. A moving vehicle steps a fixed
//! coordinate distance towards its next waypoint per tick, snapping onto the
//! node once within one step. On reaching its target it immediately picks a
//! new random destination, so the fleet never settles.

use bevy_ecs::prelude::Resource;
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::SeedableRng;

use crate::ecs::{Vehicle, VehicleId, VehicleState};
use crate::graph::{NodeId, RoadGraph};
use crate::planner::{AStarPlanner, PathPlanner};

/// Coordinate distance (degrees) a vehicle covers per tick.
pub const DEFAULT_STEP_SIZE: f64 = 0.0005;

#[derive(Resource)]
pub struct VehicleSimulator {
    planner: Box<dyn PathPlanner>,
    step_size: f64,
    rng: StdRng,
    next_id: u32,
}

impl VehicleSimulator {
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_step_size(seed, DEFAULT_STEP_SIZE)
    }

    pub fn with_step_size(seed: Option<u64>, step_size: f64) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            planner: Box::new(AStarPlanner),
            step_size,
            rng,
            next_id: 0,
        }
    }

    /// Swap the path planner.
    pub fn with_planner(mut self, planner: Box<dyn PathPlanner>) -> Self {
        self.planner = planner;
        self
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Create a vehicle at a random node and send it to a random destination.
    /// `None` when the graph has no nodes.
    pub fn spawn_vehicle(&mut self, graph: &RoadGraph) -> Option<Vehicle> {
        let node = graph.node_ids().choose(&mut self.rng)?;
        let position = graph.coordinates_of(node)?;
        let id = VehicleId(self.next_id);
        self.next_id += 1;

        let mut vehicle = Vehicle::parked(id, node, position);
        self.pick_random_destination(graph, &mut vehicle);
        Some(vehicle)
    }

    /// Spawn up to `count` vehicles. Fewer come back only for an empty graph.
    pub fn spawn_vehicles(&mut self, graph: &RoadGraph, count: usize) -> Vec<Vehicle> {
        (0..count)
            .map_while(|_| self.spawn_vehicle(graph))
            .collect()
    }

    /// Plan from the vehicle's current node to `goal`.
    ///
    /// A path of one node (already there) or zero nodes (unreachable) leaves
    /// the vehicle idle. Returns whether the vehicle is now moving.
    pub fn set_destination(&self, graph: &RoadGraph, vehicle: &mut Vehicle, goal: NodeId) -> bool {
        let path = self.planner.plan(graph, vehicle.current_node, goal);
        if path.len() <= 1 {
            trace!(
                "vehicle {:?} stays idle: no onward path {} -> {}",
                vehicle.id,
                vehicle.current_node,
                goal
            );
            vehicle.stop();
            return false;
        }
        vehicle.path = path;
        vehicle.next_waypoint = 1;
        vehicle.target_node = goal;
        vehicle.state = VehicleState::Moving;
        true
    }

    /// Advance one vehicle by one tick.
    pub fn tick(&mut self, graph: &RoadGraph, vehicle: &mut Vehicle) {
        if !vehicle.is_moving() {
            return;
        }
        let Some(waypoint) = vehicle.next_node() else {
            vehicle.stop();
            return;
        };
        let Some(waypoint_coord) = graph.coordinates_of(waypoint) else {
            vehicle.stop();
            return;
        };

        let distance = vehicle.position.planar_distance(&waypoint_coord);
        if distance < self.step_size {
            vehicle.position = waypoint_coord;
            vehicle.current_node = waypoint;
            vehicle.next_waypoint += 1;
            if vehicle.next_waypoint >= vehicle.path.len() {
                debug!("vehicle {:?} arrived at {}", vehicle.id, waypoint);
                vehicle.stop();
                self.pick_random_destination(graph, vehicle);
            }
        } else {
            vehicle.position = vehicle
                .position
                .lerp(&waypoint_coord, self.step_size / distance);
        }
    }

    /// Re-plan a moving vehicle from its current node after a weight change.
    /// Idle vehicles are left alone.
    pub fn reroute(&self, graph: &RoadGraph, vehicle: &mut Vehicle) -> bool {
        if !vehicle.is_moving() {
            return false;
        }
        let target = vehicle.target_node;
        self.set_destination(graph, vehicle, target)
    }

    /// [`reroute`](Self::reroute) every vehicle. Returns how many are moving
    /// on a fresh plan.
    pub fn reroute_all<'a>(
        &self,
        graph: &RoadGraph,
        vehicles: impl IntoIterator<Item = &'a mut Vehicle>,
    ) -> usize {
        vehicles
            .into_iter()
            .map(|vehicle| self.reroute(graph, vehicle))
            .filter(|moving| *moving)
            .count()
    }

    /// Choose a destination uniformly among the nodes other than the current
    /// one. With a single-node graph the vehicle stays idle.
    fn pick_random_destination(&mut self, graph: &RoadGraph, vehicle: &mut Vehicle) -> bool {
        let current = vehicle.current_node;
        let goal = graph
            .node_ids()
            .filter(|node| *node != current)
            .choose(&mut self.rng);
        match goal {
            Some(goal) => self.set_destination(graph, vehicle, goal),
            None => false,
        }
    }
}
