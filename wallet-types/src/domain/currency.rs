//! Currency codes and directed currency pairs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// A validated currency code: short uppercase ASCII identifier (e.g. "USD").
///
/// Validation happens at construction and at the serde boundary, so a
/// `CurrencyCode` held anywhere in the system is always well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Creates a validated currency code.
    ///
    /// Codes must be 3 to 8 uppercase ASCII letters.
    pub fn new(code: impl Into<String>) -> Result<Self, DomainError> {
        let code = code.into();
        let valid = (3..=8).contains(&code.len())
            && code.bytes().all(|b| b.is_ascii_uppercase());
        if !valid {
            return Err(DomainError::InvalidCurrency(code));
        }
        Ok(Self(code))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

/// A directed currency pair, used as the rate cache key.
///
/// `(A, B)` and `(B, A)` are distinct keys; the system never infers an
/// inverse rate from the opposite direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    from: CurrencyCode,
    to: CurrencyCode,
}

impl CurrencyPair {
    /// Creates a directed pair from source to destination currency.
    pub fn new(from: CurrencyCode, to: CurrencyCode) -> Self {
        Self { from, to }
    }

    /// Source currency.
    pub fn from_currency(&self) -> &CurrencyCode {
        &self.from
    }

    /// Destination currency.
    pub fn to_currency(&self) -> &CurrencyCode {
        &self.to
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}
