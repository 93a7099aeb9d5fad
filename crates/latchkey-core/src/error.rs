use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Protocol errors
    #[error("Invalid digit value: {value} (expected 0-9)")]
    InvalidDigit { value: u8 },

    #[error("Invalid opcode: 0x{code:02X}")]
    InvalidOpcode { code: u8 },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Transport errors
    #[error("Link closed by peer")]
    LinkClosed,

    #[error("Link receive timeout after {duration_ms}ms")]
    LinkTimeout { duration_ms: u64 },

    // Hardware errors
    #[error("Hardware operation failed: {0}")]
    Hardware(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::InvalidDigit { value: 12 }.to_string(),
            "Invalid digit value: 12 (expected 0-9)"
        );
        assert_eq!(
            Error::InvalidOpcode { code: 0xAB }.to_string(),
            "Invalid opcode: 0xAB"
        );
        assert_eq!(
            Error::LinkTimeout { duration_ms: 500 }.to_string(),
            "Link receive timeout after 500ms"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let error: Error = io.into();
        assert!(matches!(error, Error::Io(_)));
    }
}
