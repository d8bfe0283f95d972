//! Destination phone normalization.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors when parsing a [`CountryCode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CountryCodeError {
    /// Country codes start with `+`.
    #[error("country code must start with '+'")]
    MissingPlus,
    /// Country codes are `+` followed by one to four digits.
    #[error("country code must be '+' followed by 1-4 digits")]
    Malformed,
}

/// An international dialing prefix such as `+263`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// Parse a dialing prefix.
    ///
    /// # Errors
    ///
    /// Returns an error unless the input is `+` followed by 1-4 digits.
    pub fn parse(s: &str) -> Result<Self, CountryCodeError> {
        let s = s.trim();
        let digits = s.strip_prefix('+').ok_or(CountryCodeError::MissingPlus)?;
        if digits.is_empty() || digits.len() > 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CountryCodeError::Malformed);
        }
        Ok(Self(s.to_string()))
    }

    /// The prefix including the leading `+`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CountryCode {
    type Err = CountryCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CountryCode {
    type Error = CountryCodeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a phone number into international form.
///
/// Purely textual: a leading trunk `0` is replaced by the country code, a
/// number without a leading `+` gets the country code prepended, and
/// anything already starting with `+` is returned trimmed but otherwise
/// untouched. Whether the result is a real number is not checked.
#[must_use]
pub fn normalize_phone(raw: &str, country_code: &CountryCode) -> String {
    let raw = raw.trim();
    if let Some(national) = raw.strip_prefix('0') {
        format!("{country_code}{national}")
    } else if raw.starts_with('+') {
        raw.to_string()
    } else {
        format!("{country_code}{raw}")
    }
}
