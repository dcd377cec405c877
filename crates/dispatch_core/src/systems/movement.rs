//! Vehicle tick: advance every vehicle one step and report positions.

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{EventKind, SimulationClock};
use crate::ecs::{Vehicle, VehiclePosition};
use crate::graph::RoadGraph;
use crate::messages::{OutboundMessage, Outbox};
use crate::scenario::TickConfig;
use crate::simulator::VehicleSimulator;

pub fn vehicle_tick_system(
    mut clock: ResMut<SimulationClock>,
    config: Res<TickConfig>,
    graph: Res<RoadGraph>,
    mut simulator: ResMut<VehicleSimulator>,
    mut vehicles: Query<&mut Vehicle>,
    mut outbox: ResMut<Outbox>,
) {
    for mut vehicle in &mut vehicles {
        simulator.tick(&graph, &mut vehicle);
    }

    let mut positions: Vec<VehiclePosition> = vehicles.iter().map(VehiclePosition::from).collect();
    positions.sort_by_key(|p| p.id);
    outbox.push(OutboundMessage::VehiclePositions {
        at_ms: clock.now(),
        vehicles: positions,
    });

    clock.schedule_in(config.tick_interval_ms, EventKind::VehicleTick, None);
}
