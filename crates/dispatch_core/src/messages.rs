//! Messages exchanged with the transport layer.
//!
//! The transport itself lives outside this crate. It hands [`InboundMessage`]s
//! to the runner and drains [`OutboundMessage`]s from the [`Outbox`].

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::dispatch::{
    Driver, DriverRegistration, DriverSnapshot, RideId, RideOutcome, RideRequest, SessionRef,
    TripAssignment,
};
use crate::ecs::VehiclePosition;
use crate::graph::{GraphSnapshot, NodeId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    RequestRide(RideRequest),
    RegisterDriver(DriverRegistration),
    ToggleTraffic { edge_u: NodeId, edge_v: NodeId },
    VerifyPasscode { ride_id: RideId, code: String },
}

/// Wire form of a matching outcome; `found == false` carries no assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideResult {
    pub found: bool,
    pub assignment: Option<TripAssignment>,
}

impl From<RideOutcome> for RideResult {
    fn from(outcome: RideOutcome) -> Self {
        match outcome {
            RideOutcome::Assigned(assignment) => Self {
                found: true,
                assignment: Some(assignment),
            },
            RideOutcome::NotFound => Self {
                found: false,
                assignment: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    GraphSnapshot(GraphSnapshot),
    VehiclePositions {
        at_ms: u64,
        vehicles: Vec<VehiclePosition>,
    },
    DriverRoster {
        at_ms: u64,
        drivers: Vec<DriverSnapshot>,
    },
    DriverRegistered(Driver),
    /// Addressed to the matched driver's session so it can collect the
    /// rider's passcode.
    JobOffered {
        session: SessionRef,
        assignment: TripAssignment,
    },
    RideResult(RideResult),
    PasscodeResult {
        ride_id: RideId,
        valid: bool,
    },
}

/// Outbound messages waiting for the transport.
#[derive(Debug, Default, Resource)]
pub struct Outbox {
    messages: Vec<OutboundMessage>,
}

impl Outbox {
    pub fn push(&mut self, message: OutboundMessage) {
        self.messages.push(message);
    }

    pub fn drain(&mut self) -> Vec<OutboundMessage> {
        std::mem::take(&mut self.messages)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
