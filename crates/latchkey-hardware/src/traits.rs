//! Peripheral trait definitions.
//!
//! The two nodes see their hardware only through these traits. Each node
//! owns its peripherals exclusively, so methods take `&mut self` and no
//! locking is implied by the interface.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT).
//! They are therefore not object-safe; nodes are generic over them.

use crate::error::Result;
use crate::types::MotorDirection;

/// Input from the scanned keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeypadInput {
    /// Numeric digit (0-9).
    Digit(u8),

    /// Enter/confirm key.
    Enter,

    /// Plus key. Selects "open door" in the menu.
    Plus,

    /// Minus key. Selects "change credential" in the menu.
    Minus,

    /// Star key (*). Not bound to anything; the frontend skips it.
    Star,
}

impl KeypadInput {
    /// Create a digit input.
    ///
    /// # Errors
    ///
    /// Returns an error if the digit is greater than 9.
    ///
    /// # Examples
    ///
    /// ```
    /// use latchkey_hardware::KeypadInput;
    ///
    /// let input = KeypadInput::digit(5).unwrap();
    /// assert_eq!(input.as_digit(), Some(5));
    ///
    /// assert!(KeypadInput::digit(10).is_err());
    /// ```
    pub fn digit(d: u8) -> Result<Self> {
        if d > latchkey_core::constants::MAX_DIGIT {
            return Err(crate::HardwareError::invalid_data(format!(
                "Digit must be 0-9, got {d}"
            )));
        }
        Ok(Self::Digit(d))
    }

    /// Map a terminal character to a key.
    ///
    /// `#` and `=` both act as Enter, matching the legend printed on the
    /// simulator prompt.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0'..='9' => c.to_digit(10).map(|d| Self::Digit(d as u8)),
            '#' | '=' => Some(Self::Enter),
            '+' => Some(Self::Plus),
            '-' => Some(Self::Minus),
            '*' => Some(Self::Star),
            _ => None,
        }
    }

    /// Check if this input is a digit.
    pub fn is_digit(&self) -> bool {
        matches!(self, Self::Digit(_))
    }

    /// Get the digit value if this is a digit input.
    pub fn as_digit(&self) -> Option<u8> {
        match self {
            Self::Digit(d) => Some(*d),
            _ => None,
        }
    }
}

/// Keypad device abstraction.
///
/// # Examples
///
/// ```no_run
/// use latchkey_hardware::{KeypadDevice, KeypadInput, Result};
///
/// async fn read_digits<K: KeypadDevice>(keypad: &mut K) -> Result<Vec<u8>> {
///     let mut digits = Vec::new();
///     loop {
///         match keypad.read_input().await? {
///             KeypadInput::Digit(d) => digits.push(d),
///             KeypadInput::Enter => break,
///             _ => {}
///         }
///     }
///     Ok(digits)
/// }
/// ```
pub trait KeypadDevice: Send + Sync {
    /// Read the next key press, waiting until one is available.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is disconnected.
    async fn read_input(&mut self) -> Result<KeypadInput>;
}

/// Character display (HD44780-class LCD).
///
/// Rows and columns are zero-based. Writes start at the cursor and advance it.
pub trait CharacterDisplay: Send + Sync {
    /// Blank the display and home the cursor.
    async fn clear(&mut self) -> Result<()>;

    /// Move the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if the position is outside the display.
    async fn move_cursor(&mut self, row: u8, column: u8) -> Result<()>;

    /// Write a string at the cursor.
    async fn display_string(&mut self, text: &str) -> Result<()>;

    /// Write one character at the cursor.
    async fn display_character(&mut self, c: char) -> Result<()>;
}

/// Byte-addressed non-volatile store.
///
/// Operations are synchronous from the caller's view and have no
/// transactional guarantees: a multi-byte update interrupted midway leaves
/// the bytes written so far.
pub trait NvStore: Send + Sync {
    /// Read the byte at `address`.
    async fn read_byte(&mut self, address: u16) -> Result<u8>;

    /// Write `value` at `address`.
    async fn write_byte(&mut self, address: u16, value: u8) -> Result<()>;
}

/// Reversible door motor.
pub trait DoorActuator: Send + Sync {
    /// Drive the motor in `direction` at `speed` percent duty.
    async fn rotate(&mut self, direction: MotorDirection, speed: u8) -> Result<()>;
}

/// Binary doorway occupancy sensor.
pub trait MotionSensor: Send + Sync {
    /// Returns `true` while something is in the doorway.
    async fn motion_detected(&mut self) -> Result<bool>;
}

/// Binary alarm output (buzzer or lamp).
pub trait AlarmIndicator: Send + Sync {
    async fn set_alarm(&mut self, on: bool) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case('0', KeypadInput::Digit(0))]
    #[case('9', KeypadInput::Digit(9))]
    #[case('#', KeypadInput::Enter)]
    #[case('=', KeypadInput::Enter)]
    #[case('+', KeypadInput::Plus)]
    #[case('-', KeypadInput::Minus)]
    #[case('*', KeypadInput::Star)]
    fn test_from_char(#[case] c: char, #[case] expected: KeypadInput) {
        assert_eq!(KeypadInput::from_char(c), Some(expected));
    }

    #[rstest]
    #[case('a')]
    #[case(' ')]
    #[case('m')]
    #[case('c')]
    fn test_from_char_unmapped(#[case] c: char) {
        assert_eq!(KeypadInput::from_char(c), None);
    }

    #[test]
    fn test_digit_validation() {
        assert_eq!(KeypadInput::digit(7).unwrap().as_digit(), Some(7));
        assert!(KeypadInput::digit(10).is_err());
        assert!(KeypadInput::Digit(3).is_digit());
        assert!(!KeypadInput::Enter.is_digit());
        assert_eq!(KeypadInput::Plus.as_digit(), None);
    }
}
