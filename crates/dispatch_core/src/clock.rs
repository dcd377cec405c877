use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::Resource;

use crate::graph::NodeId;

pub const ONE_SEC_MS: u64 = 1_000;

/// Event kinds, in the order they run when they share a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventKind {
    TrafficToggled,
    VehicleTick,
    RosterBroadcast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSubject {
    Edge(NodeId, NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: u64,
    pub kind: EventKind,
    pub subject: Option<EventSubject>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scheduled {
    event: Event,
    seq: u64,
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed throughout to make BinaryHeap a min-heap; equal events pop
        // in scheduling order.
        other
            .event
            .timestamp
            .cmp(&self.event.timestamp)
            .then_with(|| other.event.kind.cmp(&self.event.kind))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event being processed by the current schedule run.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: u64,
    events: BinaryHeap<Scheduled>,
    seq: u64,
}

impl SimulationClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule(&mut self, event: Event) {
        debug_assert!(
            event.timestamp >= self.now,
            "event timestamp must be >= current time"
        );
        let seq = self.seq;
        self.seq += 1;
        self.events.push(Scheduled { event, seq });
    }

    pub fn schedule_at(&mut self, timestamp: u64, kind: EventKind, subject: Option<EventSubject>) {
        self.schedule(Event {
            timestamp: timestamp.max(self.now),
            kind,
            subject,
        });
    }

    pub fn schedule_in(&mut self, delay_ms: u64, kind: EventKind, subject: Option<EventSubject>) {
        self.schedule_at(self.now.saturating_add(delay_ms), kind, subject);
    }

    pub fn next_event_time(&self) -> Option<u64> {
        self.events.peek().map(|s| s.event.timestamp)
    }

    pub fn pop_next(&mut self) -> Option<Event> {
        let Scheduled { event, .. } = self.events.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    pub fn pending(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pops_events_in_time_order() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(10, EventKind::VehicleTick, None);
        clock.schedule_at(5, EventKind::VehicleTick, None);
        clock.schedule_at(20, EventKind::RosterBroadcast, None);

        let first = clock.pop_next().expect("first event");
        assert_eq!(first.timestamp, 5);
        assert_eq!(clock.now(), 5);

        let second = clock.pop_next().expect("second event");
        assert_eq!(second.timestamp, 10);

        let third = clock.pop_next().expect("third event");
        assert_eq!(third.kind, EventKind::RosterBroadcast);
        assert_eq!(clock.now(), 20);

        assert!(clock.pop_next().is_none());
        assert!(clock.is_empty());
    }

    #[test]
    fn same_timestamp_runs_traffic_before_ticks_then_fifo() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(0, EventKind::RosterBroadcast, None);
        clock.schedule_at(0, EventKind::VehicleTick, None);
        let edge = Some(EventSubject::Edge(NodeId(0), NodeId(1)));
        clock.schedule_at(0, EventKind::TrafficToggled, edge);
        clock.schedule_at(0, EventKind::TrafficToggled, None);

        let kinds: Vec<_> = std::iter::from_fn(|| clock.pop_next())
            .map(|e| (e.kind, e.subject))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (EventKind::TrafficToggled, edge),
                (EventKind::TrafficToggled, None),
                (EventKind::VehicleTick, None),
                (EventKind::RosterBroadcast, None),
            ]
        );
    }

    #[test]
    fn schedule_in_is_relative_to_now() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(100, EventKind::VehicleTick, None);
        clock.pop_next();
        clock.schedule_in(50, EventKind::VehicleTick, None);
        assert_eq!(clock.next_event_time(), Some(150));
    }
}
