//! Road graph: node coordinates plus a mutable, symmetric adjacency map.
//!
//! Edge weights are unitless step costs. Traffic toggling flips a road between
//! [`CLEAR_WEIGHT`] and [`JAM_WEIGHT`] in both directions.

use std::collections::BTreeMap;
use std::fmt;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::Coord;

/// Weight of a free-flowing road.
pub const CLEAR_WEIGHT: EdgeWeight = 1;

/// Weight of a jammed road.
pub const JAM_WEIGHT: EdgeWeight = 20;

pub type EdgeWeight = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("node {0} not found in graph")]
    UnknownNode(NodeId),

    #[error("edge {from} -> {to} must have a positive weight")]
    NonPositiveWeight { from: NodeId, to: NodeId },
}

/// Rectangular grid layout used to build the demo city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    pub width: u32,
    pub height: u32,
    pub origin: Coord,
    /// Coordinate distance between adjacent intersections (degrees).
    pub spacing: f64,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            width: 5,
            height: 5,
            origin: Coord::new(40.7128, -74.0060),
            spacing: 0.004,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: EdgeWeight,
}

/// Full graph state for clients: every node and every directed edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
}

#[derive(Debug, Clone, Default, Resource)]
pub struct RoadGraph {
    nodes: BTreeMap<NodeId, Coord>,
    edges: BTreeMap<NodeId, BTreeMap<NodeId, EdgeWeight>>,
}

impl RoadGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a `width` x `height` grid. Node `i * height + j` sits at
    /// `origin + (i * spacing, j * spacing)` and links to its right and upper
    /// neighbours in both directions with [`CLEAR_WEIGHT`].
    pub fn grid(layout: &GridLayout) -> Self {
        let mut graph = Self::new();
        let (width, height) = (layout.width, layout.height);

        for i in 0..width {
            for j in 0..height {
                let id = NodeId(i * height + j);
                graph.add_node(
                    id,
                    Coord::new(
                        layout.origin.lat + f64::from(i) * layout.spacing,
                        layout.origin.lng + f64::from(j) * layout.spacing,
                    ),
                );
            }
        }

        for i in 0..width {
            for j in 0..height {
                let current = NodeId(i * height + j);
                if j + 1 < height {
                    graph.link(current, NodeId(current.0 + 1));
                }
                if i + 1 < width {
                    graph.link(current, NodeId((i + 1) * height + j));
                }
            }
        }
        graph
    }

    fn link(&mut self, a: NodeId, b: NodeId) {
        // Both endpoints were inserted by `grid` and the weight is positive.
        self.edges.entry(a).or_default().insert(b, CLEAR_WEIGHT);
        self.edges.entry(b).or_default().insert(a, CLEAR_WEIGHT);
    }

    /// Insert (or move) a node. Existing edges are kept.
    pub fn add_node(&mut self, id: NodeId, coord: Coord) {
        self.nodes.insert(id, coord);
        self.edges.entry(id).or_default();
    }

    /// Insert a directed edge. Callers wanting a two-way road add both
    /// directions.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, weight: EdgeWeight) -> Result<(), GraphError> {
        for node in [from, to] {
            if !self.nodes.contains_key(&node) {
                return Err(GraphError::UnknownNode(node));
            }
        }
        if weight == 0 {
            return Err(GraphError::NonPositiveWeight { from, to });
        }
        self.edges.entry(from).or_default().insert(to, weight);
        Ok(())
    }

    /// Set the weight of `from -> to` and, if present, `to -> from`.
    ///
    /// Returns `Ok(false)` when neither direction exists.
    pub fn update_weight(
        &mut self,
        from: NodeId,
        to: NodeId,
        weight: EdgeWeight,
    ) -> Result<bool, GraphError> {
        if weight == 0 {
            return Err(GraphError::NonPositiveWeight { from, to });
        }
        let mut updated = false;
        for (a, b) in [(from, to), (to, from)] {
            if let Some(slot) = self.edges.get_mut(&a).and_then(|adj| adj.get_mut(&b)) {
                *slot = weight;
                updated = true;
            }
        }
        Ok(updated)
    }

    /// Flip the road between clear and jammed. Returns the new weight, or
    /// `None` when the edge does not exist.
    pub fn toggle_traffic(&mut self, from: NodeId, to: NodeId) -> Option<EdgeWeight> {
        let current = self.weight(from, to).or_else(|| self.weight(to, from))?;
        let next = if current == JAM_WEIGHT {
            CLEAR_WEIGHT
        } else {
            JAM_WEIGHT
        };
        match self.update_weight(from, to, next) {
            Ok(true) => Some(next),
            _ => None,
        }
    }

    /// Outgoing edges of `node`. Unknown nodes have no neighbours.
    pub fn neighbors_of(&self, node: NodeId) -> impl Iterator<Item = (NodeId, EdgeWeight)> + '_ {
        self.edges
            .get(&node)
            .into_iter()
            .flat_map(|adj| adj.iter().map(|(n, w)| (*n, *w)))
    }

    pub fn coordinates_of(&self, node: NodeId) -> Option<Coord> {
        self.nodes.get(&node).copied()
    }

    pub fn weight(&self, from: NodeId, to: NodeId) -> Option<EdgeWeight> {
        self.edges.get(&from)?.get(&to).copied()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Sum of edge weights along `path`; `None` if a hop is not an edge.
    pub fn path_cost(&self, path: &[NodeId]) -> Option<u64> {
        path.windows(2)
            .map(|hop| self.weight(hop[0], hop[1]).map(u64::from))
            .sum()
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        let nodes = self
            .nodes
            .iter()
            .map(|(id, c)| NodeSnapshot {
                id: *id,
                lat: c.lat,
                lng: c.lng,
            })
            .collect();
        let edges = self
            .edges
            .iter()
            .flat_map(|(from, adj)| {
                adj.iter().map(move |(to, weight)| EdgeSnapshot {
                    from: *from,
                    to: *to,
                    weight: *weight,
                })
            })
            .collect();
        GraphSnapshot { nodes, edges }
    }
}
