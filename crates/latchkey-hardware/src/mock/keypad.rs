//! Mock keypad driven through a channel.

use crate::{
    HardwareError, Result,
    traits::{KeypadDevice, KeypadInput},
};
use tokio::sync::mpsc;

/// Mock keypad device for tests and the simulator.
///
/// Key presses are injected through a [`MockKeypadHandle`].
///
/// # Examples
///
/// ```
/// use latchkey_hardware::mock::MockKeypad;
/// use latchkey_hardware::{KeypadDevice, KeypadInput};
///
/// #[tokio::main]
/// async fn main() -> latchkey_hardware::Result<()> {
///     let (mut keypad, handle) = MockKeypad::new();
///
///     handle.send_input(KeypadInput::Plus).await?;
///     assert_eq!(keypad.read_input().await?, KeypadInput::Plus);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockKeypad {
    input_rx: mpsc::Receiver<KeypadInput>,
}

impl MockKeypad {
    /// Create a new mock keypad and the handle that feeds it.
    pub fn new() -> (Self, MockKeypadHandle) {
        let (input_tx, input_rx) = mpsc::channel(32);
        (Self { input_rx }, MockKeypadHandle { input_tx })
    }
}

impl KeypadDevice for MockKeypad {
    async fn read_input(&mut self) -> Result<KeypadInput> {
        self.input_rx
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected("Keypad input channel closed"))
    }
}

/// Handle for pressing keys on a [`MockKeypad`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct MockKeypadHandle {
    input_tx: mpsc::Sender<KeypadInput>,
}

impl MockKeypadHandle {
    /// Press one key.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped.
    pub async fn send_input(&self, input: KeypadInput) -> Result<()> {
        self.input_tx
            .send(input)
            .await
            .map_err(|_| HardwareError::disconnected("Keypad input channel closed"))
    }

    /// Press a sequence of digit keys.
    ///
    /// # Errors
    ///
    /// Returns an error if any digit is greater than 9 or the keypad has been
    /// dropped.
    pub async fn send_digits(&self, digits: &[u8]) -> Result<()> {
        for &digit in digits {
            self.send_input(KeypadInput::digit(digit)?).await?;
        }
        Ok(())
    }

    /// Type a full credential followed by Enter.
    pub async fn send_credential(&self, digits: &[u8]) -> Result<()> {
        self.send_digits(digits).await?;
        self.send_input(KeypadInput::Enter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_keypad_basic_input() {
        let (mut keypad, handle) = MockKeypad::new();

        handle.send_input(KeypadInput::Digit(5)).await.unwrap();

        assert_eq!(keypad.read_input().await.unwrap(), KeypadInput::Digit(5));
    }

    #[tokio::test]
    async fn test_send_credential() {
        let (mut keypad, handle) = MockKeypad::new();

        handle.send_credential(&[9, 8, 7, 6, 5]).await.unwrap();

        for expected in [9, 8, 7, 6, 5] {
            assert_eq!(
                keypad.read_input().await.unwrap(),
                KeypadInput::Digit(expected)
            );
        }
        assert_eq!(keypad.read_input().await.unwrap(), KeypadInput::Enter);
    }

    #[tokio::test]
    async fn test_send_digits_rejects_out_of_range() {
        let (_keypad, handle) = MockKeypad::new();
        assert!(handle.send_digits(&[1, 12]).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_keypad_closed_channel() {
        let (mut keypad, handle) = MockKeypad::new();
        drop(handle);

        assert!(matches!(
            keypad.read_input().await,
            Err(HardwareError::Disconnected { .. })
        ));
    }
}
