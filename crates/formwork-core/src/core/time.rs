// crates/formwork-core/src/core/time.rs
// ============================================================================
// Module: Formwork Time Model
// Description: Absolute time bounds expressed as Unix epoch milliseconds.
// Purpose: Give queries and time ranges a caller-supplied, replayable clock value.
// Dependencies: serde, thiserror, time
// ============================================================================

//! ## Overview
//! Absolute bounds are plain Unix milliseconds on the wire. The core never
//! reads wall-clock time; operations that need "now" take it as an argument.
//! Deserialization accepts either an integer or an RFC 3339 string.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::de;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when converting between text and [`UnixMillis`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    /// Text was not a valid RFC 3339 timestamp.
    #[error("invalid rfc3339 timestamp: {0}")]
    InvalidRfc3339(String),
    /// Timestamp does not fit the millisecond range.
    #[error("timestamp out of range")]
    OutOfRange,
}

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Absolute instant in Unix epoch milliseconds.
///
/// # Invariants
/// - Values are explicitly provided by callers; the core never reads wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct UnixMillis(i64);

impl UnixMillis {
    /// Wraps a raw millisecond count.
    #[must_use]
    pub const fn new(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the raw millisecond count.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }

    /// Moves the instant back by `millis`, saturating at the range limit.
    #[must_use]
    pub fn saturating_sub_millis(self, millis: u64) -> Self {
        let delta = i64::try_from(millis).unwrap_or(i64::MAX);
        Self(self.0.saturating_sub(delta))
    }

    /// Parses an RFC 3339 timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`TimeParseError`] when the text is malformed or out of range.
    pub fn parse_rfc3339(text: &str) -> Result<Self, TimeParseError> {
        let parsed = OffsetDateTime::parse(text, &Rfc3339)
            .map_err(|err| TimeParseError::InvalidRfc3339(err.to_string()))?;
        let millis = parsed.unix_timestamp_nanos() / 1_000_000;
        i64::try_from(millis).map(Self).map_err(|_| TimeParseError::OutOfRange)
    }

    /// Formats the instant as an RFC 3339 UTC timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`TimeParseError::OutOfRange`] when the instant cannot be
    /// represented as a calendar date.
    pub fn to_rfc3339(self) -> Result<String, TimeParseError> {
        let nanos = i128::from(self.0) * 1_000_000;
        let instant =
            OffsetDateTime::from_unix_timestamp_nanos(nanos).map_err(|_| TimeParseError::OutOfRange)?;
        instant.format(&Rfc3339).map_err(|_| TimeParseError::OutOfRange)
    }
}

impl fmt::Display for UnixMillis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for UnixMillis {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for UnixMillis {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        /// Visitor accepting integers and RFC 3339 strings.
        struct MillisVisitor;

        impl de::Visitor<'_> for MillisVisitor {
            type Value = UnixMillis;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("unix milliseconds or an RFC 3339 timestamp")
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                Ok(UnixMillis(value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                i64::try_from(value).map(UnixMillis).map_err(|_| E::custom("timestamp exceeds i64 range"))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                UnixMillis::parse_rfc3339(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(MillisVisitor)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_converts_to_millis_and_back() -> Result<(), TimeParseError> {
        let parsed = UnixMillis::parse_rfc3339("2024-01-02T03:04:05.250Z")?;
        assert_eq!(parsed.as_i64(), 1_704_164_645_250);
        let rendered = parsed.to_rfc3339()?;
        assert!(rendered.starts_with("2024-01-02T03:04:05.25"));
        assert_eq!(UnixMillis::parse_rfc3339(&rendered)?, parsed);
        Ok(())
    }

    #[test]
    fn deserializes_numbers_and_strings() -> Result<(), serde_json::Error> {
        let from_number: UnixMillis = serde_json::from_str("1000")?;
        let from_text: UnixMillis = serde_json::from_str("\"1970-01-01T00:00:01Z\"")?;
        assert_eq!(from_number, from_text);
        Ok(())
    }
}
