use bevy_ecs::prelude::World;
use dispatch_core::graph::GridLayout;
use dispatch_core::messages::{OutboundMessage, Outbox};
use dispatch_core::scenario::{build_scenario, SimulationParams};

/// Builder configuration for reproducible scenario worlds.
#[derive(Clone, Debug)]
pub struct TestWorldConfig {
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    pub vehicle_count: usize,
}

impl Default for TestWorldConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            width: 5,
            height: 5,
            vehicle_count: 4,
        }
    }
}

impl TestWorldConfig {
    pub fn with_vehicle_count(mut self, count: usize) -> Self {
        self.vehicle_count = count;
        self
    }

    pub fn with_grid(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn params(&self) -> SimulationParams {
        SimulationParams::default()
            .with_seed(self.seed)
            .with_vehicle_count(self.vehicle_count)
            .with_grid(GridLayout {
                width: self.width,
                height: self.height,
                ..GridLayout::default()
            })
    }

    pub fn build(&self) -> World {
        let mut world = World::new();
        build_scenario(&mut world, self.params()).expect("valid test scenario");
        world
    }
}

/// Remove and return everything queued for the transport.
pub fn drain(world: &mut World) -> Vec<OutboundMessage> {
    world.resource_mut::<Outbox>().drain()
}

pub fn count_graph_snapshots(messages: &[OutboundMessage]) -> usize {
    messages
        .iter()
        .filter(|m| matches!(m, OutboundMessage::GraphSnapshot(_)))
        .count()
}
