//! Frontend step transition table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::machine::MachineState;

/// Screen the frontend is driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrontendStep {
    /// Enter and confirm a new credential.
    Enroll,
    /// Choose between opening the door and changing the credential.
    Menu,
    /// Verify before running the door cycle.
    VerifyForOpen,
    /// Verify before enrolling a replacement credential.
    VerifyForChange,
    /// Attempt budget spent; wait out the cooldown.
    Lockout,
}

impl FrontendStep {
    /// Returns `true` for the two verification steps.
    pub fn is_verifying(self) -> bool {
        matches!(self, FrontendStep::VerifyForOpen | FrontendStep::VerifyForChange)
    }
}

/// Outcome of running one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontendEvent {
    EnrollmentAccepted,
    EnrollmentRejected,
    OpenSelected,
    ChangeSelected,
    VerificationAccepted,
    VerificationRejected,
    AttemptsExhausted,
    CooldownElapsed,
}

/// Exchange the frontend starts on a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontendAction {
    /// Run the unlock handshake with the authority.
    UnlockDoor,
    /// Tell the authority to sound the alarm.
    NotifyLockout,
}

impl MachineState for FrontendStep {
    type Event = FrontendEvent;
    type Action = FrontendAction;

    fn next(self, event: FrontendEvent) -> Option<(Self, Option<FrontendAction>)> {
        use FrontendEvent::*;
        use FrontendStep::*;

        let next = match (self, event) {
            (Enroll, EnrollmentAccepted) => (Menu, None),
            (Enroll, EnrollmentRejected) => (Enroll, None),

            (Menu, OpenSelected) => (VerifyForOpen, None),
            (Menu, ChangeSelected) => (VerifyForChange, None),

            (VerifyForOpen, VerificationAccepted) => (Menu, Some(FrontendAction::UnlockDoor)),
            (VerifyForChange, VerificationAccepted) => (Enroll, None),
            (step, VerificationRejected) if step.is_verifying() => (step, None),
            (step, AttemptsExhausted) if step.is_verifying() => {
                (Lockout, Some(FrontendAction::NotifyLockout))
            }

            (Lockout, CooldownElapsed) => (Menu, None),
            _ => return None,
        };
        Some(next)
    }
}

impl fmt::Display for FrontendStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrontendStep::Enroll => "Enroll",
            FrontendStep::Menu => "Menu",
            FrontendStep::VerifyForOpen => "VerifyForOpen",
            FrontendStep::VerifyForChange => "VerifyForChange",
            FrontendStep::Lockout => "Lockout",
        };
        write!(f, "{name}")
    }
}
