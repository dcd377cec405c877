use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

use crate::geo::Coord;
use crate::graph::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleState {
    Idle,
    Moving,
}

/// A simulated car travelling the road graph.
#[derive(Debug, Clone, PartialEq, Component)]
pub struct Vehicle {
    pub id: VehicleId,
    pub current_node: NodeId,
    pub target_node: NodeId,
    /// Planned nodes, `current_node` first. Empty while idle.
    pub path: Vec<NodeId>,
    /// Continuous position; lies between `current_node` and the next waypoint
    /// while moving.
    pub position: Coord,
    /// Index into `path` of the node being approached.
    pub next_waypoint: usize,
    pub state: VehicleState,
}

impl Vehicle {
    /// An idle vehicle parked at `node`.
    pub fn parked(id: VehicleId, node: NodeId, position: Coord) -> Self {
        Self {
            id,
            current_node: node,
            target_node: node,
            path: Vec::new(),
            position,
            next_waypoint: 0,
            state: VehicleState::Idle,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.state == VehicleState::Moving
    }

    /// Node currently being approached, if moving.
    pub fn next_node(&self) -> Option<NodeId> {
        if !self.is_moving() {
            return None;
        }
        self.path.get(self.next_waypoint).copied()
    }

    pub(crate) fn stop(&mut self) {
        self.state = VehicleState::Idle;
        self.path.clear();
        self.next_waypoint = 0;
    }
}

/// Per-tick position report for one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehiclePosition {
    pub id: VehicleId,
    pub lat: f64,
    pub lng: f64,
    pub moving: bool,
    pub current_node: NodeId,
    pub target_node: NodeId,
}

impl From<&Vehicle> for VehiclePosition {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            id: vehicle.id,
            lat: vehicle.position.lat,
            lng: vehicle.position.lng,
            moving: vehicle.is_moving(),
            current_node: vehicle.current_node,
            target_node: vehicle.target_node,
        }
    }
}
