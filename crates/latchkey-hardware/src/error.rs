//! Error types for peripheral operations.
//!
//! Peripherals fail for mundane reasons: a keypad channel closes, a store
//! address falls outside the device, a persisted image cannot be parsed.
//! Node code converts these into [`latchkey_core::Error::Hardware`] with `?`.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during peripheral operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Address outside the non-volatile store.
    #[error("Address 0x{address:04X} out of range (store size {size})")]
    InvalidAddress { address: u16, size: usize },

    /// Invalid data read from or supplied to a device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new invalid address error.
    pub fn invalid_address(address: u16, size: usize) -> Self {
        Self::InvalidAddress { address, size }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }
}

impl From<HardwareError> for latchkey_core::Error {
    fn from(error: HardwareError) -> Self {
        match error {
            HardwareError::Io(e) => latchkey_core::Error::Io(e),
            other => latchkey_core::Error::Hardware(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("keypad");
        assert!(matches!(error, HardwareError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: keypad");
    }

    #[test]
    fn test_invalid_address_error() {
        let error = HardwareError::invalid_address(0x0400, 1024);
        assert_eq!(
            error.to_string(),
            "Address 0x0400 out of range (store size 1024)"
        );
    }

    #[test]
    fn test_conversion_into_core_error() {
        let error: latchkey_core::Error = HardwareError::invalid_data("odd image").into();
        assert!(matches!(
            error,
            latchkey_core::Error::Hardware(ref message) if message == "Invalid data: odd image"
        ));

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: latchkey_core::Error = HardwareError::from(io).into();
        assert!(matches!(error, latchkey_core::Error::Io(_)));
    }
}
