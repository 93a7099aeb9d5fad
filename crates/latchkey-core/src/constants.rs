//! Core constants for the two-node door lock protocol.
//!
//! This module defines every compile-time constant shared by the frontend
//! (keypad + display) node and the authority (credential store + door
//! actuator) node. Both nodes are built from this single definition so that
//! opcode values, timing windows, and the persisted layout can never drift
//! apart.
//!
//! # Wire Model
//!
//! The link carries single bytes with no framing, length field, or checksum:
//!
//! ```text
//! Frontend                     Authority
//!    |  <------- PEER_READY ------ |
//!    |  --------- GET_STATUS ----> |
//!    |  <------ status byte ------ |
//!    |  ---- CHECK_CREDENTIAL ---> |
//!    |  --------- digit 0 -------> |
//!    |  <------- NEXT_DIGIT ------ |
//!    |          ... x5 ...         |
//!    |  ---- CREDENTIAL_SAVED ---> |   (terminator)
//!    |  <---- MATCH / NO_MATCH --- |
//! ```
//!
//! # Usage
//!
//! ```
//! use latchkey_core::constants::*;
//!
//! assert_eq!(CREDENTIAL_LENGTH, 5);
//! assert_eq!(STATUS_ADDRESS, CREDENTIAL_BASE_ADDRESS + 5);
//! ```
//!
//! # Protocol Compliance
//!
//! These values reproduce the deployed firmware exactly. Changing any of
//! them breaks interoperability with already-flashed nodes.

// ============================================================================
// Opcodes
// ============================================================================

/// Authority boot notification, sent once before the command loop.
pub const OP_PEER_READY: u8 = 0xE0;

/// Frontend request for the persisted [`SystemStatus`](crate::SystemStatus).
pub const OP_GET_STATUS: u8 = 0xE1;

/// Context opcode opening the candidate half of an enrollment.
pub const OP_SET_NEW_CREDENTIAL: u8 = 0xE2;

/// Per-digit acknowledgment sent by the receiver of a credential transfer.
pub const OP_NEXT_DIGIT: u8 = 0xE3;

/// Context opcode opening the confirmation half of an enrollment.
pub const OP_CONFIRM: u8 = 0xE4;

/// Comparison reply: the credentials are equal.
pub const OP_MATCH: u8 = 0xE5;

/// Comparison reply: the credentials differ.
pub const OP_NO_MATCH: u8 = 0xE6;

/// Context opcode opening a verification transfer.
pub const OP_CHECK_CREDENTIAL: u8 = 0xE7;

/// Generic receipt acknowledgment.
///
/// Part of the shared vocabulary but never emitted by either node.
pub const OP_RECEIVED: u8 = 0xE9;

/// Frontend notification that the attempt budget is exhausted.
pub const OP_LOCKOUT_NOTIFY: u8 = 0xF0;

/// Frontend request to run the door cycle.
pub const OP_UNLOCK_DOOR: u8 = 0xF1;

/// Authority notification that the doorway is clear and relocking begins.
pub const OP_LOCK_DOOR: u8 = 0xF2;

/// Credential-saved marker.
///
/// This single byte plays three roles: the terminator of every credential
/// transfer, the persisted status byte after a successful enrollment, and the
/// `GET_STATUS` reply meaning a credential exists. It is the ASCII `#`.
pub const OP_CREDENTIAL_SAVED: u8 = 0x23;

/// Value of an idle line or an erased store cell.
pub const IDLE_BYTE: u8 = 0xFF;

// ============================================================================
// Credential Layout
// ============================================================================

/// Number of digits in a credential.
pub const CREDENTIAL_LENGTH: usize = 5;

/// Bytes in a persisted credential record (digits + status sentinel).
pub const CREDENTIAL_RECORD_LENGTH: usize = CREDENTIAL_LENGTH + 1;

/// Highest value a credential digit may take.
pub const MAX_DIGIT: u8 = 9;

/// Store address of the first credential digit.
pub const CREDENTIAL_BASE_ADDRESS: u16 = 0x0311;

/// Store address of the status/sentinel byte that follows the digits.
pub const STATUS_ADDRESS: u16 = CREDENTIAL_BASE_ADDRESS + CREDENTIAL_LENGTH as u16;

// ============================================================================
// Timing
// ============================================================================

/// Settle delay after each non-volatile byte operation (milliseconds).
pub const STORE_SETTLE_MS: u64 = 10;

/// Extra settle delay between persisting a credential and re-reading it
/// into the cache (milliseconds).
pub const POST_PERSIST_SETTLE_MS: u64 = 30;

/// Door actuation window for both unlocking and relocking (seconds).
pub const DOOR_ACTUATION_SECS: u32 = 15;

/// Lockout cooldown after the attempt budget is exhausted (seconds).
pub const LOCKOUT_COOLDOWN_SECS: u32 = 60;

/// Debounce delay after each key read during digit entry (milliseconds).
pub const KEY_DEBOUNCE_MS: u64 = 250;

/// Splash screen hold at frontend boot (milliseconds).
pub const SPLASH_HOLD_MS: u64 = 3000;

/// Hold time for match/mismatch outcome messages (milliseconds).
pub const OUTCOME_HOLD_MS: u64 = 1000;

/// Period between motion sensor reads while waiting for a clear doorway
/// (milliseconds).
pub const MOTION_POLL_MS: u64 = 10;

/// Software timer tick period used for second-granularity delays
/// (milliseconds).
pub const TIMER_TICK_MS: u64 = 1000;

/// Period between `elapsed()` polls while a node waits on its software
/// timer (milliseconds).
pub const TIMER_POLL_MS: u64 = 10;

// ============================================================================
// Policy
// ============================================================================

/// Consecutive failed verifications that trigger a lockout.
pub const MAX_FAILED_ATTEMPTS: u8 = 3;

/// Actuator duty cycle used for both door directions (percent).
pub const DOOR_MOTOR_SPEED: u8 = 100;

// ============================================================================
// Serial Line
// ============================================================================

/// Baud rate of the deployed UART link (8 data bits, no parity, 1 stop bit).
pub const SERIAL_BAUD_RATE: u32 = 2400;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcodes_are_distinct() {
        let opcodes = [
            OP_PEER_READY,
            OP_GET_STATUS,
            OP_SET_NEW_CREDENTIAL,
            OP_NEXT_DIGIT,
            OP_CONFIRM,
            OP_MATCH,
            OP_NO_MATCH,
            OP_CHECK_CREDENTIAL,
            OP_RECEIVED,
            OP_LOCKOUT_NOTIFY,
            OP_UNLOCK_DOOR,
            OP_LOCK_DOOR,
            OP_CREDENTIAL_SAVED,
        ];

        for (i, a) in opcodes.iter().enumerate() {
            for b in &opcodes[i + 1..] {
                assert_ne!(a, b, "opcode 0x{a:02X} is duplicated");
            }
        }
    }

    #[test]
    fn test_opcodes_never_collide_with_digits_or_idle() {
        for op in [OP_NEXT_DIGIT, OP_MATCH, OP_NO_MATCH, OP_CREDENTIAL_SAVED] {
            assert!(op > MAX_DIGIT);
            assert_ne!(op, IDLE_BYTE);
        }
    }

    #[test]
    fn test_record_layout() {
        assert_eq!(CREDENTIAL_RECORD_LENGTH, 6);
        assert_eq!(STATUS_ADDRESS, 0x0316);
    }
}
