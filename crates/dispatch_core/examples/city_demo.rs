//! Run the 5x5 demo city for one simulated minute: register drivers, jam a
//! road, request a few rides and print every outbound message as JSON.
//!
//! Run with: RUST_LOG=info cargo run -p dispatch_core --example city_demo

use bevy_ecs::prelude::World;
use dispatch_core::dispatch::{DriverAttributes, DriverRegistration, RideRequest, SessionRef};
use dispatch_core::geo::Coord;
use dispatch_core::graph::NodeId;
use dispatch_core::messages::{InboundMessage, OutboundMessage};
use dispatch_core::runner::{drain_outbox, handle_inbound, run_until, simulation_schedule};
use dispatch_core::scenario::{build_scenario, SimulationParams};

fn print(message: &OutboundMessage) {
    match serde_json::to_string(message) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("failed to encode message: {err}"),
    }
}

fn main() {
    env_logger::init();

    const SIMULATION_MS: u64 = 60_000;

    let mut world = World::new();
    if let Err(err) = build_scenario(&mut world, SimulationParams::default().with_seed(123)) {
        eprintln!("invalid scenario: {err}");
        return;
    }
    let mut schedule = simulation_schedule();

    let drivers = [
        (40.7130, -74.0055, None),
        (40.7200, -74.0000, Some("verified")),
        (40.7150, -74.0030, Some("unverified")),
    ];
    for (i, (lat, lng, category)) in drivers.into_iter().enumerate() {
        let registration = DriverRegistration {
            session: SessionRef(format!("demo-{i}")),
            location: Coord::new(lat, lng),
            attributes: DriverAttributes {
                trust_category: category.map(str::to_string),
            },
        };
        if let Some(reply) = handle_inbound(&mut world, InboundMessage::RegisterDriver(registration)) {
            print(&reply);
        }
    }

    let mut steps = run_until(&mut world, &mut schedule, 10_000);
    handle_inbound(
        &mut world,
        InboundMessage::ToggleTraffic {
            edge_u: NodeId(6),
            edge_v: NodeId(7),
        },
    );

    for safety_mode in [false, true] {
        let request = RideRequest {
            pickup: Coord::new(40.7140, -74.0050),
            dropoff: Coord::new(40.7280, -73.9940),
            safety_mode,
        };
        if let Some(reply) = handle_inbound(&mut world, InboundMessage::RequestRide(request)) {
            print(&reply);
        }
    }

    steps += run_until(&mut world, &mut schedule, SIMULATION_MS);
    let messages = drain_outbox(&mut world);
    for message in messages.iter().filter(|m| !matches!(m, OutboundMessage::VehiclePositions { .. })) {
        print(message);
    }
    println!(
        "--- {} steps, {} outbound messages over {} s ---",
        steps,
        messages.len(),
        SIMULATION_MS / 1_000
    );
}
