//! Device serial numbers and serial detection in free text.
//!
//! A serial is exactly 14 ASCII characters: `R` followed by 13 letters or
//! digits. Detection scans text split on whitespace, `,` and `;` and returns
//! the first token that matches the whole pattern.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Error;

static SERIAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^R[A-Za-z0-9]{13}$").expect("serial pattern is valid"));

/// A validated device serial number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerialNumber(String);

impl SerialNumber {
    /// Validate and wrap a serial.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSerial` unless the whole input matches
    /// `^R[A-Za-z0-9]{13}$`. Surrounding whitespace is not trimmed.
    pub fn parse(input: &str) -> Result<Self, Error> {
        if Self::is_valid(input) { Ok(Self(input.to_string())) } else { Err(Error::InvalidSerial(input.to_string())) }
    }

    /// Pure validity predicate.
    pub fn is_valid(input: &str) -> bool {
        SERIAL_PATTERN.is_match(input)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the serial begins with any of the given prefixes.
    pub fn has_any_prefix<S: AsRef<str>>(&self, prefixes: &[S]) -> bool {
        prefixes.iter().any(|p| self.0.starts_with(p.as_ref()))
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SerialNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SerialNumber {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if Self::is_valid(&value) { Ok(Self(value)) } else { Err(Error::InvalidSerial(value)) }
    }
}

impl From<SerialNumber> for String {
    fn from(serial: SerialNumber) -> Self {
        serial.0
    }
}

impl AsRef<str> for SerialNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Find the first serial in `text`, in scan order.
///
/// Tokens are separated by any whitespace run, `,` or `;`. Partial matches
/// inside a longer token are not accepted.
pub fn extract_serial(text: &str) -> Option<SerialNumber> {
    text.split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .find(|token| SerialNumber::is_valid(token))
        .map(|token| SerialNumber(token.to_string()))
}
