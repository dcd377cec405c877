//! Traffic toggles: flip an edge, re-plan every moving vehicle, publish the
//! new graph.

use bevy_ecs::prelude::{Query, Res, ResMut};
use log::{debug, info};

use crate::clock::{CurrentEvent, EventSubject};
use crate::ecs::Vehicle;
use crate::graph::RoadGraph;
use crate::messages::{OutboundMessage, Outbox};
use crate::simulator::VehicleSimulator;

pub fn traffic_toggle_system(
    event: Res<CurrentEvent>,
    mut graph: ResMut<RoadGraph>,
    simulator: Res<VehicleSimulator>,
    mut vehicles: Query<&mut Vehicle>,
    mut outbox: ResMut<Outbox>,
) {
    let Some(EventSubject::Edge(from, to)) = event.0.subject else {
        return;
    };
    let Some(weight) = graph.toggle_traffic(from, to) else {
        debug!("ignoring traffic toggle on missing edge {from} - {to}");
        return;
    };

    let rerouted = simulator.reroute_all(
        &graph,
        vehicles.iter_mut().map(|vehicle| vehicle.into_inner()),
    );
    info!("edge {from} - {to} now weighs {weight}; rerouted {rerouted} vehicles");

    outbox.push(OutboundMessage::GraphSnapshot(graph.snapshot()));
}
