// crates/formwork-core/src/core/interval.rs
// ============================================================================
// Module: Formwork Intervals
// Description: Compact duration strings and their structured wire form.
// Purpose: Convert `5m` / `1.5h` style input to `{value, unit}` and back.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Users type durations as `<number><code>` with codes `ms s m h d w M y`.
//! Integer values keep their unit (expanded to the long name); fractional
//! values are converted to whole milliseconds, rounding half up. Codes are
//! case-sensitive: `m` is minutes and `M` is months.
//!
//! Months count as 30 days and years as 365 days.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Short codes accepted by [`parse_interval`], for diagnostics.
pub const ACCEPTED_CODES: &str = "ms, s, m, h, d, w, M, y";
/// Maximum fractional digits honored when converting to milliseconds.
const MAX_FRACTION_DIGITS: usize = 18;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by interval parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalError {
    /// Text does not match `<number><code>`.
    #[error("invalid interval `{input}`: expected <number><unit> with unit one of {}", ACCEPTED_CODES)]
    Format {
        /// Rejected input.
        input: String,
    },
    /// Value does not fit in 64 bits after conversion.
    #[error("interval `{input}` is too large")]
    Overflow {
        /// Rejected input.
        input: String,
    },
    /// Long unit name is not recognized.
    #[error(
        "unknown interval unit `{unit}`: expected milliseconds, seconds, minutes, hours, days, \
         weeks, months, or years"
    )]
    UnknownUnit {
        /// Rejected unit name.
        unit: String,
    },
}

// ============================================================================
// SECTION: Units
// ============================================================================

/// Duration unit, serialized by its long name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    /// `ms`
    Milliseconds,
    /// `s`
    Seconds,
    /// `m`
    Minutes,
    /// `h`
    Hours,
    /// `d`
    Days,
    /// `w`
    Weeks,
    /// `M` (30 days)
    Months,
    /// `y` (365 days)
    Years,
}

impl IntervalUnit {
    /// Every unit, with `ms` ahead of the single-character codes.
    pub const ALL: [Self; 8] = [
        Self::Milliseconds,
        Self::Seconds,
        Self::Minutes,
        Self::Hours,
        Self::Days,
        Self::Weeks,
        Self::Months,
        Self::Years,
    ];

    /// Returns the short code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
            Self::Minutes => "m",
            Self::Hours => "h",
            Self::Days => "d",
            Self::Weeks => "w",
            Self::Months => "M",
            Self::Years => "y",
        }
    }

    /// Returns the plural long name used on the wire.
    #[must_use]
    pub const fn long_name(self) -> &'static str {
        match self {
            Self::Milliseconds => "milliseconds",
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
            Self::Years => "years",
        }
    }

    /// Returns the number of milliseconds in one unit.
    #[must_use]
    pub const fn millis_per_unit(self) -> u64 {
        match self {
            Self::Milliseconds => 1,
            Self::Seconds => 1_000,
            Self::Minutes => 60_000,
            Self::Hours => 3_600_000,
            Self::Days => 86_400_000,
            Self::Weeks => 604_800_000,
            Self::Months => 2_592_000_000,
            Self::Years => 31_536_000_000,
        }
    }

    /// Looks up a unit by exact short code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|unit| unit.code() == code)
    }

    /// Looks up a unit by long name, ignoring ASCII case and accepting the
    /// singular form.
    #[must_use]
    pub fn from_long_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|unit| {
            let long = unit.long_name();
            long.eq_ignore_ascii_case(name) || long[.. long.len() - 1].eq_ignore_ascii_case(name)
        })
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.long_name())
    }
}

impl FromStr for IntervalUnit {
    type Err = IntervalError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_long_name(value).or_else(|| Self::from_code(value)).ok_or_else(|| {
            IntervalError::UnknownUnit {
                unit: value.to_string(),
            }
        })
    }
}

// ============================================================================
// SECTION: Interval
// ============================================================================

/// Structured duration as exchanged with the query service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    /// Whole number of units.
    pub value: u64,
    /// Unit of `value`.
    pub unit: IntervalUnit,
}

impl Interval {
    /// Creates an interval.
    #[must_use]
    pub const fn new(value: u64, unit: IntervalUnit) -> Self {
        Self {
            value,
            unit,
        }
    }

    /// Returns the length in milliseconds, or `None` on overflow.
    #[must_use]
    pub const fn as_millis(&self) -> Option<u64> {
        self.value.checked_mul(self.unit.millis_per_unit())
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_interval(self))
    }
}

impl FromStr for Interval {
    type Err = IntervalError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_interval(value)
    }
}

// ============================================================================
// SECTION: Conversions
// ============================================================================

/// Parses `<number><code>` into an interval.
///
/// Integer values keep their unit. Fractional values (not allowed with `ms`)
/// become whole milliseconds, rounded half up. A fraction of zeros such as
/// `2.0h` counts as an integer.
///
/// # Errors
///
/// Returns [`IntervalError::Format`] when the text does not match and
/// [`IntervalError::Overflow`] when the result exceeds 64 bits.
pub fn parse_interval(text: &str) -> Result<Interval, IntervalError> {
    let input = text.trim();
    let format_error = || IntervalError::Format {
        input: text.to_string(),
    };
    let split = input.find(|ch: char| !(ch.is_ascii_digit() || ch == '.')).ok_or_else(format_error)?;
    let (number, code) = input.split_at(split);
    let unit = IntervalUnit::from_code(code).ok_or_else(format_error)?;
    let (whole, fraction) = match number.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (number, None),
    };
    if !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format_error());
    }

    let overflow = || IntervalError::Overflow {
        input: text.to_string(),
    };
    let fraction = match fraction {
        None => None,
        Some(fraction) if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) => {
            return Err(format_error());
        }
        Some(fraction) if fraction.bytes().all(|b| b == b'0') => None,
        Some(fraction) => Some(fraction),
    };

    let whole_value = if whole.is_empty() {
        if fraction.is_none() && !number.contains('.') {
            return Err(format_error());
        }
        0
    } else {
        whole.parse::<u64>().map_err(|_| overflow())?
    };

    let Some(fraction) = fraction else {
        return Ok(Interval::new(whole_value, unit));
    };
    if unit == IntervalUnit::Milliseconds {
        return Err(format_error());
    }
    let millis = fractional_millis(whole_value, fraction, unit).ok_or_else(overflow)?;
    Ok(Interval::new(millis, IntervalUnit::Milliseconds))
}

/// Converts `whole.fraction` units to milliseconds, rounding half up.
fn fractional_millis(whole: u64, fraction: &str, unit: IntervalUnit) -> Option<u64> {
    let digits = &fraction[.. fraction.len().min(MAX_FRACTION_DIGITS)];
    let scale = 10_u128.checked_pow(u32::try_from(digits.len()).ok()?)?;
    let fraction_value: u128 = digits.parse().ok()?;
    let numerator = u128::from(whole).checked_mul(scale)?.checked_add(fraction_value)?;
    let scaled = numerator.checked_mul(u128::from(unit.millis_per_unit()))?;
    let rounded = scaled.checked_add(scale / 2)? / scale;
    u64::try_from(rounded).ok()
}

/// Renders an interval as `<value><code>`.
#[must_use]
pub fn format_interval(interval: &Interval) -> String {
    format!("{}{}", interval.value, interval.unit.code())
}

/// Renders an interval as `<value> <unit name>`, singular when `value == 1`.
#[must_use]
pub fn to_long_form(interval: &Interval) -> String {
    let name = interval.unit.long_name();
    let name = if interval.value == 1 { name.strip_suffix('s').unwrap_or(name) } else { name };
    format!("{} {name}", interval.value)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up() -> Result<(), IntervalError> {
        assert_eq!(parse_interval("0.0005s")?, Interval::new(1, IntervalUnit::Milliseconds));
        assert_eq!(parse_interval("0.0004s")?, Interval::new(0, IntervalUnit::Milliseconds));
        Ok(())
    }

    #[test]
    fn zero_fraction_keeps_unit() -> Result<(), IntervalError> {
        assert_eq!(parse_interval("2.0h")?, Interval::new(2, IntervalUnit::Hours));
        assert_eq!(parse_interval("5.00ms")?, Interval::new(5, IntervalUnit::Milliseconds));
        Ok(())
    }

    #[test]
    fn overflow_is_reported() {
        let result = parse_interval("99999999999999999999s");
        assert!(matches!(result, Err(IntervalError::Overflow { .. })));
    }
}
