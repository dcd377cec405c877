//! Periodic roster broadcast. Drivers whose trip has ended are released
//! first so the roster reflects them as idle.

use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{EventKind, SimulationClock};
use crate::dispatch::DispatchEngine;
use crate::messages::{OutboundMessage, Outbox};
use crate::scenario::TickConfig;

pub fn roster_broadcast_system(
    mut clock: ResMut<SimulationClock>,
    config: Res<TickConfig>,
    mut dispatch: ResMut<DispatchEngine>,
    mut outbox: ResMut<Outbox>,
) {
    let now = clock.now();
    dispatch.complete_due_trips(now);
    outbox.push(OutboundMessage::DriverRoster {
        at_ms: now,
        drivers: dispatch.roster(),
    });
    clock.schedule_in(config.roster_interval_ms, EventKind::RosterBroadcast, None);
}
