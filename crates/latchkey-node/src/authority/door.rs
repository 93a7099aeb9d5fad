//! Door cycle transition table.
//!
//! ```text
//! Idle --unlock requested--> Unlocking --actuation elapsed--> OpenWait
//!   ^                                                            |
//!   +---actuation elapsed--- Relocking <----motion cleared-------+
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::machine::MachineState;

/// Where the door is in its unlock/relock cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorPhase {
    /// Bolt thrown, motor stopped.
    Idle,
    /// Motor driving forward for the actuation window.
    Unlocking,
    /// Door open; waiting for the doorway to clear.
    OpenWait,
    /// Motor driving in reverse for the actuation window.
    Relocking,
}

/// Inputs to the door cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorEvent {
    UnlockRequested,
    ActuationElapsed,
    MotionCleared,
}

/// What the authority must do on a door transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorAction {
    /// Drive the motor forward.
    Unlock,
    /// Stop the motor.
    Halt,
    /// Tell the frontend the door is locking, then drive the motor in reverse.
    Relock,
}

impl MachineState for DoorPhase {
    type Event = DoorEvent;
    type Action = DoorAction;

    fn next(self, event: DoorEvent) -> Option<(Self, Option<DoorAction>)> {
        use DoorAction::*;
        use DoorEvent::*;
        use DoorPhase::*;

        match (self, event) {
            (Idle, UnlockRequested) => Some((Unlocking, Some(Unlock))),
            (Unlocking, ActuationElapsed) => Some((OpenWait, Some(Halt))),
            (OpenWait, MotionCleared) => Some((Relocking, Some(Relock))),
            (Relocking, ActuationElapsed) => Some((Idle, Some(Halt))),
            _ => None,
        }
    }
}

impl fmt::Display for DoorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DoorPhase::Idle => "Idle",
            DoorPhase::Unlocking => "Unlocking",
            DoorPhase::OpenWait => "OpenWait",
            DoorPhase::Relocking => "Relocking",
        };
        write!(f, "{name}")
    }
}
