//! Commands the authority dispatches.

use std::fmt;

use latchkey_protocol::Opcode;

/// A command byte the authority acts on.
///
/// Every other byte, including the idle line value, is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Reply with the persisted status byte.
    GetStatus,
    /// Receive candidate and confirmation, compare, persist on match.
    SetNewCredential,
    /// Receive a credential and compare it with the cached one.
    CheckCredential,
    /// Sound the alarm for the lockout cooldown.
    LockoutNotify,
    /// Run the door cycle.
    UnlockDoor,
}

impl Command {
    /// Decode a received byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match Opcode::from_u8(byte)? {
            Opcode::GetStatus => Some(Command::GetStatus),
            Opcode::SetNewCredential => Some(Command::SetNewCredential),
            Opcode::CheckCredential => Some(Command::CheckCredential),
            Opcode::LockoutNotify => Some(Command::LockoutNotify),
            Opcode::UnlockDoor => Some(Command::UnlockDoor),
            _ => None,
        }
    }

    pub fn opcode(self) -> Opcode {
        match self {
            Command::GetStatus => Opcode::GetStatus,
            Command::SetNewCredential => Opcode::SetNewCredential,
            Command::CheckCredential => Opcode::CheckCredential,
            Command::LockoutNotify => Opcode::LockoutNotify,
            Command::UnlockDoor => Opcode::UnlockDoor,
        }
    }

    /// Returns `true` if the authority answers this command with a byte.
    pub fn replies(self) -> bool {
        !matches!(self, Command::LockoutNotify)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opcode().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0xE1, Some(Command::GetStatus))]
    #[case(0xE2, Some(Command::SetNewCredential))]
    #[case(0xE7, Some(Command::CheckCredential))]
    #[case(0xF0, Some(Command::LockoutNotify))]
    #[case(0xF1, Some(Command::UnlockDoor))]
    #[case(0xFF, None)]
    #[case(0xE4, None)]
    #[case(0xE3, None)]
    #[case(0x23, None)]
    #[case(0x05, None)]
    fn test_from_byte(#[case] byte: u8, #[case] expected: Option<Command>) {
        assert_eq!(Command::from_byte(byte), expected);
    }

    #[test]
    fn test_commands_match_opcode_classification() {
        for opcode in Opcode::ALL {
            let command = Command::from_byte(opcode.to_u8());
            assert_eq!(command.is_some(), opcode.is_command(), "{opcode}");
            if let Some(command) = command {
                assert_eq!(command.opcode(), opcode);
            }
        }
    }

    #[test]
    fn test_only_lockout_is_silent() {
        assert!(!Command::LockoutNotify.replies());
        assert!(Command::GetStatus.replies());
        assert!(Command::UnlockDoor.replies());
    }
}
