use bevy_ecs::prelude::World;
use log::info;

use crate::clock::{EventKind, SimulationClock};
use crate::dispatch::DispatchEngine;
use crate::graph::RoadGraph;
use crate::messages::{OutboundMessage, Outbox};
use crate::scenario::params::{ConfigError, SimulationParams};
use crate::simulator::VehicleSimulator;

/// Populate `world` with the city: road graph, vehicle fleet, dispatch engine,
/// clock and outbox. The first vehicle tick and roster broadcast are
/// scheduled at time 0 and the initial graph snapshot is queued.
pub fn build_scenario(world: &mut World, params: SimulationParams) -> Result<(), ConfigError> {
    params.validate()?;

    let graph = RoadGraph::grid(&params.grid);
    let mut simulator = VehicleSimulator::with_step_size(params.seed, params.step_size);
    let vehicles = simulator.spawn_vehicles(&graph, params.vehicle_count);
    info!(
        "built {}x{} grid with {} vehicles",
        params.grid.width,
        params.grid.height,
        vehicles.len()
    );

    let dispatch_seed = params.seed.map(|seed| seed.wrapping_add(1));
    let dispatch = DispatchEngine::new(params.dispatch.clone(), dispatch_seed);

    let mut outbox = Outbox::default();
    outbox.push(OutboundMessage::GraphSnapshot(graph.snapshot()));

    let mut clock = SimulationClock::default();
    clock.schedule_at(0, EventKind::VehicleTick, None);
    clock.schedule_at(0, EventKind::RosterBroadcast, None);

    world.spawn_batch(vehicles);
    world.insert_resource(graph);
    world.insert_resource(simulator);
    world.insert_resource(dispatch);
    world.insert_resource(outbox);
    world.insert_resource(clock);
    world.insert_resource(params.tick_config());
    Ok(())
}
