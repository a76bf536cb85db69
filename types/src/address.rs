//! Participant address type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// The identity of a participant or of the election authority.
///
/// Addresses are opaque strings: non-empty, free of whitespace and at most
/// [`Address::MAX_LEN`] bytes long. They are compared byte-for-byte.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Longest accepted address, in bytes.
    pub const MAX_LEN: usize = 128;

    /// Parse and validate a raw address string.
    pub fn new(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        if s.is_empty() {
            return Err(TypesError::InvalidAddress("address is empty".into()));
        }
        if s.len() > Self::MAX_LEN {
            return Err(TypesError::InvalidAddress(format!(
                "address is {} bytes, max {}",
                s.len(),
                Self::MAX_LEN
            )));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(TypesError::InvalidAddress(format!(
                "address {s:?} contains whitespace"
            )));
        }
        Ok(Self(s))
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Address {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Address {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}
