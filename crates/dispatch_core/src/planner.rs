//! Path planning over the [`RoadGraph`].
//!
//! [`AStarPlanner`] is a best-first search whose priority is accumulated edge
//! weight plus the straight-line coordinate distance to the goal. Weights are
//! step counts and the heuristic is in degrees, so the search is only
//! approximately optimal; on the demo grid the heuristic is tiny next to a
//! single edge and the result matches Dijkstra.
//!
//! The planner keeps no state between calls, so it can be re-run after every
//! weight change.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::graph::{NodeId, RoadGraph};

/// Pluggable path planner. Implementations must be `Send + Sync` so the
/// simulator can be stored as a shared ECS resource.
pub trait PathPlanner: Send + Sync {
    /// Ordered nodes from `start` to `goal` inclusive.
    ///
    /// Empty when `goal` is unreachable or either node is unknown. When
    /// `start == goal` the path is `[start]`, meaning "already there".
    fn plan(&self, graph: &RoadGraph, start: NodeId, goal: NodeId) -> Vec<NodeId>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AStarPlanner;

#[derive(Debug, Clone, Copy)]
struct Frontier {
    priority: f64,
    cost: u64,
    node: NodeId,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the lowest priority first.
        other.priority.total_cmp(&self.priority)
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PathPlanner for AStarPlanner {
    fn plan(&self, graph: &RoadGraph, start: NodeId, goal: NodeId) -> Vec<NodeId> {
        let Some(goal_coord) = graph.coordinates_of(goal) else {
            return Vec::new();
        };
        if !graph.contains(start) {
            return Vec::new();
        }
        let heuristic = |node: NodeId| {
            graph
                .coordinates_of(node)
                .map(|c| c.planar_distance(&goal_coord))
                .unwrap_or(0.0)
        };

        let mut frontier = BinaryHeap::new();
        let mut came_from: HashMap<NodeId, Option<NodeId>> = HashMap::new();
        let mut cost_so_far: HashMap<NodeId, u64> = HashMap::new();

        frontier.push(Frontier {
            priority: 0.0,
            cost: 0,
            node: start,
        });
        came_from.insert(start, None);
        cost_so_far.insert(start, 0);

        while let Some(Frontier { cost, node, .. }) = frontier.pop() {
            if node == goal {
                break;
            }
            // Stale entry superseded by a cheaper push.
            if cost_so_far.get(&node).is_some_and(|best| cost > *best) {
                continue;
            }

            for (next, weight) in graph.neighbors_of(node) {
                let new_cost = cost + u64::from(weight);
                let improves = cost_so_far.get(&next).map_or(true, |old| new_cost < *old);
                if improves {
                    cost_so_far.insert(next, new_cost);
                    came_from.insert(next, Some(node));
                    frontier.push(Frontier {
                        priority: new_cost as f64 + heuristic(next),
                        cost: new_cost,
                        node: next,
                    });
                }
            }
        }

        reconstruct(&came_from, start, goal)
    }
}

fn reconstruct(
    came_from: &HashMap<NodeId, Option<NodeId>>,
    start: NodeId,
    goal: NodeId,
) -> Vec<NodeId> {
    if !came_from.contains_key(&goal) {
        return Vec::new();
    }
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        match came_from.get(&current).copied().flatten() {
            Some(prev) => {
                path.push(prev);
                current = prev;
            }
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}
