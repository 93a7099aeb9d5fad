//! Typed protocol messages.
//!
//! The wire carries bare bytes; [`Message`] names what a byte (or a whole
//! credential transfer) means so callers can log and match on intent rather
//! than on hex values.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Opcode;
use latchkey_core::{Credential, SystemStatus};

/// A logical protocol message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Message {
    /// Authority boot notification.
    PeerReady,
    /// Status query from the frontend.
    GetStatus,
    /// Status reply from the authority.
    Status(SystemStatus),
    /// Candidate credential of an enrollment.
    SetNewCredential(Credential),
    /// Confirmation credential of an enrollment.
    Confirm(Credential),
    /// Credential presented for verification.
    CheckCredential(Credential),
    /// Per-digit acknowledgment.
    NextDigit,
    /// Comparison reply: equal.
    Match,
    /// Comparison reply: different.
    NoMatch,
    /// Generic receipt acknowledgment.
    Received,
    /// Attempt budget exhausted.
    LockoutNotify,
    /// Run the door cycle.
    UnlockDoor,
    /// Doorway clear, relocking.
    LockDoor,
}

impl Message {
    /// The opcode that starts this message on the wire.
    ///
    /// A status reply has no opcode of its own; it is reported as
    /// `CredentialSaved` when saved and `None` otherwise.
    #[must_use]
    pub fn opcode(&self) -> Option<Opcode> {
        Some(match self {
            Message::PeerReady => Opcode::PeerReady,
            Message::GetStatus => Opcode::GetStatus,
            Message::Status(status) => return Opcode::from_u8(status.to_u8()),
            Message::SetNewCredential(_) => Opcode::SetNewCredential,
            Message::Confirm(_) => Opcode::Confirm,
            Message::CheckCredential(_) => Opcode::CheckCredential,
            Message::NextDigit => Opcode::NextDigit,
            Message::Match => Opcode::Match,
            Message::NoMatch => Opcode::NoMatch,
            Message::Received => Opcode::Received,
            Message::LockoutNotify => Opcode::LockoutNotify,
            Message::UnlockDoor => Opcode::UnlockDoor,
            Message::LockDoor => Opcode::LockDoor,
        })
    }

    /// The first byte this message puts on the wire.
    #[must_use]
    pub fn wire_byte(&self) -> u8 {
        match self {
            Message::Status(status) => status.to_u8(),
            other => other.opcode().map_or(latchkey_core::constants::IDLE_BYTE, Opcode::to_u8),
        }
    }

    /// The credential carried by a transfer message.
    #[must_use]
    pub fn credential(&self) -> Option<&Credential> {
        match self {
            Message::SetNewCredential(c) | Message::Confirm(c) | Message::CheckCredential(c) => {
                Some(c)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Status(status) => write!(f, "STATUS({status})"),
            other => match other.opcode() {
                Some(op) => write!(f, "{}", op.name()),
                None => write!(f, "UNKNOWN"),
            },
        }
    }
}

/// Result of a credential comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Match,
    NoMatch,
}

impl Verdict {
    /// Decode a comparison reply. Anything other than `MATCH` is a mismatch.
    #[must_use]
    pub fn from_u8(value: u8) -> Self {
        if value == Opcode::Match.to_u8() {
            Verdict::Match
        } else {
            Verdict::NoMatch
        }
    }

    /// Build a verdict from an equality test.
    #[must_use]
    pub fn from_equal(equal: bool) -> Self {
        if equal { Verdict::Match } else { Verdict::NoMatch }
    }

    #[must_use]
    pub fn opcode(self) -> Opcode {
        match self {
            Verdict::Match => Opcode::Match,
            Verdict::NoMatch => Opcode::NoMatch,
        }
    }

    #[must_use]
    pub fn is_match(self) -> bool {
        matches!(self, Verdict::Match)
    }
}

impl From<Verdict> for Message {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Match => Message::Match,
            Verdict::NoMatch => Message::NoMatch,
        }
    }
}
