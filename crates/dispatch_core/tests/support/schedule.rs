use bevy_ecs::prelude::World;
use bevy_ecs::schedule::Schedule;
use dispatch_core::runner::{run_next_event, run_until, simulation_schedule};

/// Helper that owns a reusable `Schedule` so tests can step or advance the
/// event queue.
pub struct ScheduleRunner {
    schedule: Schedule,
}

impl Default for ScheduleRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleRunner {
    pub fn new() -> Self {
        Self {
            schedule: simulation_schedule(),
        }
    }

    /// Run a single event (returns `true` if an event was processed).
    pub fn run_one(&mut self, world: &mut World) -> bool {
        run_next_event(world, &mut self.schedule)
    }

    /// Run every event due at or before `until_ms`.
    pub fn run_until(&mut self, world: &mut World, until_ms: u64) -> usize {
        run_until(world, &mut self.schedule, until_ms)
    }
}
