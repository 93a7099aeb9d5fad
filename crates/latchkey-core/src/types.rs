use crate::{
    Result,
    constants::{CREDENTIAL_LENGTH, CREDENTIAL_RECORD_LENGTH, IDLE_BYTE, MAX_DIGIT, OP_CREDENTIAL_SAVED},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// A single credential digit (0-9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Digit(u8);

impl Digit {
    /// Create a digit with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidDigit` if the value is greater than 9.
    pub fn new(value: u8) -> Result<Self> {
        if value > MAX_DIGIT {
            return Err(Error::InvalidDigit { value });
        }
        Ok(Digit(value))
    }

    /// Get the raw digit value.
    #[inline]
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self.0
    }

    /// Create a digit from an ASCII character ('0'-'9').
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        c.to_digit(10).map(|d| Digit(d as u8))
    }
}

impl TryFrom<u8> for Digit {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Digit::new(value)
    }
}

impl From<Digit> for u8 {
    fn from(digit: Digit) -> u8 {
        digit.0
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The 5-digit access credential.
///
/// # Security
/// Equality is constant-time so that comparing a candidate against the
/// canonical credential takes the same time regardless of where they differ.
/// `Debug` and `Display` never reveal the digits.
#[derive(Clone, Copy, Eq, Serialize, Deserialize)]
pub struct Credential([Digit; CREDENTIAL_LENGTH]);

impl Credential {
    /// Create a credential from raw digit values.
    ///
    /// # Errors
    /// Returns `Error::InvalidDigit` for the first value greater than 9.
    pub fn new(values: [u8; CREDENTIAL_LENGTH]) -> Result<Self> {
        let mut digits = [Digit(0); CREDENTIAL_LENGTH];
        for (slot, value) in digits.iter_mut().zip(values) {
            *slot = Digit::new(value)?;
        }
        Ok(Credential(digits))
    }

    /// Create a credential from already validated digits.
    #[must_use]
    pub fn from_digits(digits: [Digit; CREDENTIAL_LENGTH]) -> Self {
        Credential(digits)
    }

    /// Digits in entry order.
    #[must_use]
    pub fn digits(&self) -> &[Digit; CREDENTIAL_LENGTH] {
        &self.0
    }

    /// Raw digit values in entry order.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; CREDENTIAL_LENGTH] {
        self.0.map(Digit::as_u8)
    }

    /// The persisted record: the digits followed by the saved sentinel.
    #[must_use]
    pub fn to_record(&self) -> [u8; CREDENTIAL_RECORD_LENGTH] {
        let mut record = [OP_CREDENTIAL_SAVED; CREDENTIAL_RECORD_LENGTH];
        record[..CREDENTIAL_LENGTH].copy_from_slice(&self.to_bytes());
        record
    }
}

impl TryFrom<[u8; CREDENTIAL_LENGTH]> for Credential {
    type Error = Error;

    fn try_from(values: [u8; CREDENTIAL_LENGTH]) -> Result<Self> {
        Credential::new(values)
    }
}

/// Constant-time, position-sensitive comparison.
impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes().ct_eq(&other.to_bytes()).into()
    }
}

impl std::hash::Hash for Credential {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Credential({self})")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", "*".repeat(CREDENTIAL_LENGTH))
    }
}

impl std::str::FromStr for Credential {
    type Err = Error;

    /// Parse a credential from exactly five ASCII digits, e.g. `"12345"`.
    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != CREDENTIAL_LENGTH {
            return Err(Error::Config(format!(
                "Credential must be {CREDENTIAL_LENGTH} digits, got {}",
                bytes.len()
            )));
        }

        let mut values = [0u8; CREDENTIAL_LENGTH];
        for (slot, &b) in values.iter_mut().zip(bytes) {
            *slot = b.wrapping_sub(b'0');
        }
        Credential::new(values)
    }
}

/// Persisted system status, reported in reply to `GET_STATUS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemStatus {
    /// No credential has ever been enrolled.
    NoCredential,
    /// A credential record with the saved sentinel exists in the store.
    CredentialSaved,
}

impl SystemStatus {
    /// Decode a status byte.
    ///
    /// Only the saved sentinel means a credential exists; every other value,
    /// including an erased cell, means none.
    #[inline]
    #[must_use]
    pub fn from_u8(value: u8) -> Self {
        if value == OP_CREDENTIAL_SAVED {
            SystemStatus::CredentialSaved
        } else {
            SystemStatus::NoCredential
        }
    }

    /// Encode the status as the byte found in a store in this state.
    #[inline]
    #[must_use]
    pub fn to_u8(self) -> u8 {
        match self {
            SystemStatus::NoCredential => IDLE_BYTE,
            SystemStatus::CredentialSaved => OP_CREDENTIAL_SAVED,
        }
    }

    /// Returns `true` if a credential is saved.
    #[inline]
    #[must_use]
    pub fn is_saved(self) -> bool {
        matches!(self, SystemStatus::CredentialSaved)
    }
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SystemStatus::NoCredential => write!(f, "NoCredential"),
            SystemStatus::CredentialSaved => write!(f, "CredentialSaved"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(5)]
    #[case(9)]
    fn test_digit_valid(#[case] value: u8) {
        assert_eq!(Digit::new(value).unwrap().as_u8(), value);
    }

    #[rstest]
    #[case(10)]
    #[case(0x23)]
    #[case(0xFF)]
    fn test_digit_invalid(#[case] value: u8) {
        assert!(matches!(
            Digit::new(value),
            Err(Error::InvalidDigit { value: v }) if v == value
        ));
    }

    #[test]
    fn test_digit_from_char() {
        assert_eq!(Digit::from_char('7').map(Digit::as_u8), Some(7));
        assert_eq!(Digit::from_char('+'), None);
    }

    #[test]
    fn test_credential_equality() {
        let a = Credential::new([1, 2, 3, 4, 5]).unwrap();
        let b = Credential::new([1, 2, 3, 4, 5]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_credential_comparison_is_position_sensitive() {
        let forward = Credential::new([1, 2, 3, 4, 5]).unwrap();
        let reversed = Credential::new([5, 4, 3, 2, 1]).unwrap();
        assert_ne!(forward, reversed);
    }

    #[test]
    fn test_credential_rejects_out_of_range_digit() {
        assert!(Credential::new([1, 2, 10, 4, 5]).is_err());
    }

    #[rstest]
    #[case("12345", [1, 2, 3, 4, 5])]
    #[case("00000", [0, 0, 0, 0, 0])]
    #[case("99999", [9, 9, 9, 9, 9])]
    fn test_credential_parse(#[case] input: &str, #[case] expected: [u8; 5]) {
        let credential: Credential = input.parse().unwrap();
        assert_eq!(credential.to_bytes(), expected);
    }

    #[rstest]
    #[case("1234")]
    #[case("123456")]
    #[case("12a45")]
    #[case("")]
    fn test_credential_parse_invalid(#[case] input: &str) {
        assert!(input.parse::<Credential>().is_err());
    }

    #[test]
    fn test_credential_record() {
        let credential = Credential::new([9, 8, 7, 6, 5]).unwrap();
        assert_eq!(credential.to_record(), [9, 8, 7, 6, 5, 0x23]);
    }

    #[test]
    fn test_credential_formatting_is_masked() {
        let credential = Credential::new([1, 2, 3, 4, 5]).unwrap();
        assert_eq!(credential.to_string(), "*****");
        assert_eq!(format!("{credential:?}"), "Credential(*****)");
    }

    #[test]
    fn test_system_status() {
        assert_eq!(SystemStatus::from_u8(0x23), SystemStatus::CredentialSaved);
        assert_eq!(SystemStatus::from_u8(0xFF), SystemStatus::NoCredential);
        assert_eq!(SystemStatus::from_u8(0x00), SystemStatus::NoCredential);

        assert_eq!(SystemStatus::CredentialSaved.to_u8(), 0x23);
        assert_eq!(SystemStatus::NoCredential.to_u8(), 0xFF);
        assert!(SystemStatus::CredentialSaved.is_saved());
        assert!(!SystemStatus::NoCredential.is_saved());
    }

    #[test]
    fn test_credential_serialization_validates_digits() {
        let credential = Credential::new([1, 2, 3, 4, 5]).unwrap();
        let json = serde_json::to_string(&credential).unwrap();
        assert_eq!(json, "[1,2,3,4,5]");

        let decoded: Credential = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, credential);

        assert!(serde_json::from_str::<Credential>("[1,2,3,4,12]").is_err());
    }
}
