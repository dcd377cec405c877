//! Simulation runner: advances the clock, routes events into the ECS and
//! applies inbound transport messages.
//!
//! Each step pops the next event from [`SimulationClock`], inserts it as
//! [`CurrentEvent`], then runs the schedule. Inbound messages are applied
//! between steps; everything mutates the one `World`, so there is a single
//! writer for graph, roster and fleet.

use bevy_ecs::prelude::{Res, Schedule, World};
use bevy_ecs::schedule::IntoSystemConfigs;

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::dispatch::DispatchEngine;
use crate::messages::{InboundMessage, OutboundMessage, Outbox};
use crate::systems::{
    movement::vehicle_tick_system, roster::roster_broadcast_system,
    traffic::traffic_toggle_system,
};

fn is_traffic_toggled(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::TrafficToggled)
        .unwrap_or(false)
}

fn is_vehicle_tick(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::VehicleTick)
        .unwrap_or(false)
}

fn is_roster_broadcast(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::RosterBroadcast)
        .unwrap_or(false)
}

/// Builds the simulation schedule; each system runs only for its event kind.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((
        traffic_toggle_system.run_if(is_traffic_toggled),
        vehicle_tick_system.run_if(is_vehicle_tick),
        roster_broadcast_system.run_if(is_roster_broadcast),
    ));
    schedule
}

/// Runs one simulation step. Returns `false` when the clock is empty.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    let event = match world.resource_mut::<SimulationClock>().pop_next() {
        Some(e) => e,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    true
}

/// Runs every event due at or before `until_ms`. Returns the number of steps.
pub fn run_until(world: &mut World, schedule: &mut Schedule, until_ms: u64) -> usize {
    let mut steps = 0;
    loop {
        let due = world
            .resource::<SimulationClock>()
            .next_event_time()
            .is_some_and(|ts| ts <= until_ms);
        if !due || !run_next_event(world, schedule) {
            break;
        }
        steps += 1;
    }
    steps
}

/// Apply one inbound message. Requests that expect an answer return it.
/// A successful match also queues a job offer for the driver in the
/// [`Outbox`]; traffic toggles are queued on the clock and show up later as a
/// graph snapshot.
pub fn handle_inbound(world: &mut World, message: InboundMessage) -> Option<OutboundMessage> {
    let now = world.resource::<SimulationClock>().now();
    match message {
        InboundMessage::RequestRide(request) => {
            let mut dispatch = world.resource_mut::<DispatchEngine>();
            let outcome = dispatch.request_ride(&request, now);
            let offer = outcome.assignment().and_then(|assignment| {
                let driver = dispatch.driver(assignment.driver_id)?;
                Some(OutboundMessage::JobOffered {
                    session: driver.session.clone(),
                    assignment: assignment.clone(),
                })
            });
            if let Some(offer) = offer {
                world.resource_mut::<Outbox>().push(offer);
            }
            Some(OutboundMessage::RideResult(outcome.into()))
        }
        InboundMessage::RegisterDriver(registration) => {
            let driver = world
                .resource_mut::<DispatchEngine>()
                .register_driver(registration);
            Some(OutboundMessage::DriverRegistered(driver))
        }
        InboundMessage::ToggleTraffic { edge_u, edge_v } => {
            world.resource_mut::<SimulationClock>().schedule_at(
                now,
                EventKind::TrafficToggled,
                Some(EventSubject::Edge(edge_u, edge_v)),
            );
            None
        }
        InboundMessage::VerifyPasscode { ride_id, code } => {
            let valid = world
                .resource_mut::<DispatchEngine>()
                .verify_passcode(ride_id, &code);
            Some(OutboundMessage::PasscodeResult { ride_id, valid })
        }
    }
}

/// Take everything queued for the transport.
pub fn drain_outbox(world: &mut World) -> Vec<OutboundMessage> {
    world.resource_mut::<Outbox>().drain()
}
