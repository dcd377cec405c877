use dispatch_core::graph::{GridLayout, NodeId, RoadGraph, JAM_WEIGHT};
use dispatch_core::planner::{AStarPlanner, PathPlanner};
use dispatch_core::test_helpers::line_graph;
use pathfinding::prelude::dijkstra;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn dijkstra_cost(graph: &RoadGraph, start: NodeId, goal: NodeId) -> Option<u64> {
    dijkstra(
        &start,
        |node| {
            graph
                .neighbors_of(*node)
                .map(|(next, weight)| (next, u64::from(weight)))
                .collect::<Vec<_>>()
        },
        |node| *node == goal,
    )
    .map(|(_, cost)| cost)
}

fn jammed_grid(rng: &mut StdRng, width: u32, height: u32) -> RoadGraph {
    let mut graph = RoadGraph::grid(&GridLayout {
        width,
        height,
        ..GridLayout::default()
    });
    let edges: Vec<(NodeId, NodeId)> = graph
        .snapshot()
        .edges
        .iter()
        .map(|e| (e.from, e.to))
        .collect();
    for (from, to) in edges {
        if rng.gen_bool(0.3) {
            graph
                .update_weight(from, to, JAM_WEIGHT)
                .expect("positive weight");
        }
    }
    graph
}

#[test]
fn planner_matches_dijkstra_on_jammed_grids() {
    let mut rng = StdRng::seed_from_u64(42);
    let planner = AStarPlanner;

    for _ in 0..25 {
        let graph = jammed_grid(&mut rng, 4, 4);
        let start = NodeId(rng.gen_range(0..16));
        let goal = NodeId(rng.gen_range(0..16));

        let path = planner.plan(&graph, start, goal);
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert_eq!(
            graph.path_cost(&path),
            dijkstra_cost(&graph, start, goal),
            "{start} -> {goal}"
        );
    }
}

#[test]
fn jamming_a_bridge_adds_exactly_the_weight_delta() {
    let mut graph = line_graph(3);
    let planner = AStarPlanner;

    let before = planner.plan(&graph, NodeId(0), NodeId(2));
    assert_eq!(graph.path_cost(&before), Some(2));

    assert_eq!(graph.toggle_traffic(NodeId(1), NodeId(2)), Some(JAM_WEIGHT));
    let after = planner.plan(&graph, NodeId(0), NodeId(2));
    assert_eq!(after, before);
    assert_eq!(graph.path_cost(&after), Some(2 + 19));

    graph.toggle_traffic(NodeId(2), NodeId(1));
    let restored = planner.plan(&graph, NodeId(0), NodeId(2));
    assert_eq!(graph.path_cost(&restored), Some(2));
}

#[test]
fn start_equal_to_goal_is_a_single_node_path() {
    let graph = line_graph(3);
    assert_eq!(AStarPlanner.plan(&graph, NodeId(1), NodeId(1)), vec![NodeId(1)]);
}

#[test]
fn disconnected_goal_yields_empty_path() {
    let mut graph = line_graph(3);
    graph.add_node(NodeId(10), dispatch_core::geo::Coord::new(5.0, 5.0));
    assert!(AStarPlanner.plan(&graph, NodeId(0), NodeId(10)).is_empty());
    assert!(AStarPlanner.plan(&graph, NodeId(0), NodeId(99)).is_empty());
}
