//! Single-byte opcode vocabulary shared by both nodes.
//!
//! Every value comes from [`latchkey_core::constants`], so the frontend and
//! the authority are compiled from one source of truth.

use serde::{Deserialize, Serialize};
use std::fmt;

use latchkey_core::constants::*;
use latchkey_core::{Error, Result};

/// Protocol opcode.
///
/// Each variant's discriminant is its wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Opcode {
    /// Authority finished booting.
    PeerReady = OP_PEER_READY,
    /// Query the persisted system status.
    GetStatus = OP_GET_STATUS,
    /// Context for the candidate half of an enrollment.
    SetNewCredential = OP_SET_NEW_CREDENTIAL,
    /// Acknowledge one received credential digit.
    NextDigit = OP_NEXT_DIGIT,
    /// Context for the confirmation half of an enrollment.
    Confirm = OP_CONFIRM,
    /// Credentials are equal.
    Match = OP_MATCH,
    /// Credentials differ.
    NoMatch = OP_NO_MATCH,
    /// Context for a verification transfer.
    CheckCredential = OP_CHECK_CREDENTIAL,
    /// Generic receipt acknowledgment (reserved).
    Received = OP_RECEIVED,
    /// Attempt budget exhausted; start the alarm cooldown.
    LockoutNotify = OP_LOCKOUT_NOTIFY,
    /// Run the door cycle.
    UnlockDoor = OP_UNLOCK_DOOR,
    /// Doorway clear; relocking.
    LockDoor = OP_LOCK_DOOR,
    /// Transfer terminator and credential-saved status marker.
    CredentialSaved = OP_CREDENTIAL_SAVED,
}

impl Opcode {
    /// Every opcode, in wire-value table order.
    pub const ALL: [Opcode; 13] = [
        Opcode::CredentialSaved,
        Opcode::PeerReady,
        Opcode::GetStatus,
        Opcode::SetNewCredential,
        Opcode::NextDigit,
        Opcode::Confirm,
        Opcode::Match,
        Opcode::NoMatch,
        Opcode::CheckCredential,
        Opcode::Received,
        Opcode::LockoutNotify,
        Opcode::UnlockDoor,
        Opcode::LockDoor,
    ];

    /// Decode a wire byte, returning `None` for bytes outside the vocabulary.
    #[inline]
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.to_u8() == value)
    }

    /// The wire value.
    #[inline]
    #[must_use]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Returns `true` for opcodes the authority dispatches as commands.
    #[must_use]
    pub fn is_command(self) -> bool {
        matches!(
            self,
            Opcode::GetStatus
                | Opcode::SetNewCredential
                | Opcode::CheckCredential
                | Opcode::LockoutNotify
                | Opcode::UnlockDoor
        )
    }

    /// Returns `true` for opcodes that open a credential transfer.
    #[must_use]
    pub fn opens_transfer(self) -> bool {
        matches!(
            self,
            Opcode::SetNewCredential | Opcode::Confirm | Opcode::CheckCredential
        )
    }

    /// Protocol name, as used in logs and the opcode table.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Opcode::PeerReady => "PEER_READY",
            Opcode::GetStatus => "GET_STATUS",
            Opcode::SetNewCredential => "SET_NEW_CREDENTIAL",
            Opcode::NextDigit => "NEXT_DIGIT",
            Opcode::Confirm => "CONFIRM",
            Opcode::Match => "MATCH",
            Opcode::NoMatch => "NO_MATCH",
            Opcode::CheckCredential => "CHECK_CREDENTIAL",
            Opcode::Received => "RECEIVED",
            Opcode::LockoutNotify => "LOCKOUT_NOTIFY",
            Opcode::UnlockDoor => "UNLOCK_DOOR",
            Opcode::LockDoor => "LOCK_DOOR",
            Opcode::CredentialSaved => "CREDENTIAL_SAVED",
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Opcode::from_u8(value).ok_or(Error::InvalidOpcode { code: value })
    }
}

impl From<Opcode> for u8 {
    fn from(opcode: Opcode) -> u8 {
        opcode.to_u8()
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), self.to_u8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0xE0, Opcode::PeerReady)]
    #[case(0xE1, Opcode::GetStatus)]
    #[case(0xE2, Opcode::SetNewCredential)]
    #[case(0xE3, Opcode::NextDigit)]
    #[case(0xE4, Opcode::Confirm)]
    #[case(0xE5, Opcode::Match)]
    #[case(0xE6, Opcode::NoMatch)]
    #[case(0xE7, Opcode::CheckCredential)]
    #[case(0xE9, Opcode::Received)]
    #[case(0xF0, Opcode::LockoutNotify)]
    #[case(0xF1, Opcode::UnlockDoor)]
    #[case(0xF2, Opcode::LockDoor)]
    #[case(0x23, Opcode::CredentialSaved)]
    fn test_wire_values(#[case] byte: u8, #[case] opcode: Opcode) {
        assert_eq!(Opcode::from_u8(byte), Some(opcode));
        assert_eq!(opcode.to_u8(), byte);
    }

    #[rstest]
    #[case(0x00)]
    #[case(0x09)]
    #[case(0xE8)]
    #[case(0xFF)]
    fn test_unknown_bytes(#[case] byte: u8) {
        assert_eq!(Opcode::from_u8(byte), None);
        assert!(matches!(
            Opcode::try_from(byte),
            Err(Error::InvalidOpcode { code }) if code == byte
        ));
    }

    #[test]
    fn test_command_classification() {
        let commands: Vec<_> = Opcode::ALL.iter().filter(|op| op.is_command()).collect();
        assert_eq!(commands.len(), 5);
        assert!(!Opcode::Match.is_command());
        assert!(!Opcode::Confirm.is_command());
    }

    #[test]
    fn test_transfer_openers() {
        assert!(Opcode::SetNewCredential.opens_transfer());
        assert!(Opcode::Confirm.opens_transfer());
        assert!(Opcode::CheckCredential.opens_transfer());
        assert!(!Opcode::UnlockDoor.opens_transfer());
    }

    #[test]
    fn test_display() {
        assert_eq!(Opcode::UnlockDoor.to_string(), "UNLOCK_DOOR(0xF1)");
        assert_eq!(Opcode::CredentialSaved.to_string(), "CREDENTIAL_SAVED(0x23)");
    }
}
