//! Stationery lookup PIN.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Pin`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PinError {
    /// The input is not exactly [`Pin::LENGTH`] characters long.
    #[error("PIN must be exactly {expected} digits")]
    WrongLength {
        /// Required number of digits.
        expected: usize,
    },
    /// The input contains something other than ASCII digits.
    #[error("PIN must contain only digits")]
    NonDigit,
}

/// A stationery pickup code.
///
/// ## Constraints
///
/// - Exactly three characters
/// - Every character is an ASCII digit (leading zeros are significant)
///
/// ## Examples
///
/// ```
/// use campus_desk_core::Pin;
///
/// assert!(Pin::parse("007").is_ok());
///
/// assert!(Pin::parse("12").is_err());
/// assert!(Pin::parse("abcd").is_err());
/// assert!(Pin::parse("1234").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Pin(String);

impl Pin {
    /// Number of digits in a PIN.
    pub const LENGTH: usize = 3;

    /// Parse a `Pin`. Surrounding whitespace is not trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`PinError`] unless the input is exactly three ASCII digits.
    pub fn parse(s: &str) -> Result<Self, PinError> {
        // Length in chars, so "१२३" (non-ASCII digits) is a NonDigit, not a length error.
        if s.chars().count() != Self::LENGTH {
            return Err(PinError::WrongLength {
                expected: Self::LENGTH,
            });
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PinError::NonDigit);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the PIN as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Pin {
    type Err = PinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Pin {
    type Error = PinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Pin> for String {
    fn from(pin: Pin) -> Self {
        pin.0
    }
}
