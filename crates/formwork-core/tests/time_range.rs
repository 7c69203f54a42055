// crates/formwork-core/tests/time_range.rs
// ============================================================================
// Test Module: Time-Range State Machine
// Coverage: Validity, mode derivation, normalization, mode switches.
// ============================================================================
//! ## Overview
//! Integration tests for [`TimeRange`].
//!
//! [`TimeRange`]: formwork_core::TimeRange

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod support;

use formwork_core::BoundMode;
use formwork_core::Endpoint;
use formwork_core::Interval;
use formwork_core::IntervalUnit;
use formwork_core::TimeRange;
use formwork_core::TimeRangeDefaults;
use formwork_core::TimeRangeError;
use formwork_core::TimeSeriesQuery;
use formwork_core::UnixMillis;
use support::TestResult;
use support::ensure;

/// Fixed instant used as "now".
const NOW: UnixMillis = UnixMillis::new(1_700_000_000_000);

/// Tests that a fresh range is invalid and shows the initial modes.
#[test]
fn empty_range_is_invalid() -> TestResult {
    let range = TimeRange::default();
    ensure(!range.is_valid(), "Expected empty range to be invalid")?;
    ensure(range.start_mode() == BoundMode::Relative, "Expected relative start mode")?;
    ensure(range.end_mode() == BoundMode::None, "Expected no end mode")?;
    Ok(())
}

/// Tests the conflict then normalize sequence on the start bound.
#[test]
fn conflicting_start_is_normalized_to_relative() -> TestResult {
    let mut range = TimeRange::default();
    range.set_start_absolute(Some(UnixMillis::new(1_000)));
    ensure(range.is_valid(), "Expected absolute start alone to be valid")?;
    ensure(range.start_mode() == BoundMode::Absolute, "Expected absolute start mode")?;
    ensure(range.end_mode() == BoundMode::None, "Expected no end mode")?;

    range.set_start_relative(Some(Interval::new(2, IntervalUnit::Hours)));
    ensure(!range.is_valid(), "Expected both starts to be invalid")?;
    ensure(range.start_mode() == BoundMode::Absolute, "Expected last valid mode to stick")?;

    range.normalize();
    ensure(range.is_valid(), "Expected normalized range to be valid")?;
    ensure(range.start_absolute().is_none(), "Expected absolute start cleared")?;
    ensure(range.start_relative() == Some(Interval::new(2, IntervalUnit::Hours)), "Expected relative kept")?;
    ensure(range.start_mode() == BoundMode::Relative, "Expected relative start mode")?;
    Ok(())
}

/// Tests normalization of a missing start and a conflicting end.
#[test]
fn normalize_fills_start_and_keeps_absolute_end() -> TestResult {
    let mut range = TimeRange::default();
    range.set_end_relative(Some(Interval::new(5, IntervalUnit::Minutes)));
    range.set_end_absolute(Some(NOW));
    range.normalize();
    ensure(range.is_valid(), "Expected valid range")?;
    ensure(range.start_relative() == Some(TimeRangeDefaults::default().start_relative), "Expected default start")?;
    ensure(range.end_relative().is_none() && range.end_absolute() == Some(NOW), "Expected absolute end kept")?;
    ensure(range.end_mode() == BoundMode::Absolute, "Expected absolute end mode")?;
    Ok(())
}

/// Tests mode switches and their default bounds.
#[test]
fn set_mode_installs_defaults() -> TestResult {
    let mut range = TimeRange::default();
    ensure(
        range.set_mode(Endpoint::Start, BoundMode::None, NOW) == Err(TimeRangeError::StartRequired),
        "Expected start to be required",
    )?;

    range.set_mode(Endpoint::Start, BoundMode::Absolute, NOW)?;
    ensure(range.start_absolute() == Some(UnixMillis::new(NOW.as_i64() - 3_600_000)), "Expected now minus 1h")?;
    ensure(range.start_relative().is_none(), "Expected relative start cleared")?;

    range.set_mode(Endpoint::End, BoundMode::Relative, NOW)?;
    ensure(range.end_relative() == Some(Interval::new(1, IntervalUnit::Minutes)), "Expected 1m end")?;
    ensure(range.end_mode() == BoundMode::Relative, "Expected relative end mode")?;

    range.set_mode(Endpoint::End, BoundMode::Absolute, NOW)?;
    ensure(range.end_absolute() == Some(NOW) && range.end_relative().is_none(), "Expected end at now")?;

    range.set_mode(Endpoint::End, BoundMode::None, NOW)?;
    ensure(range.end_absolute().is_none() && range.end_relative().is_none(), "Expected no end")?;
    ensure(range.end_mode() == BoundMode::None, "Expected no end mode")?;

    range.set_mode(Endpoint::Start, BoundMode::Relative, NOW)?;
    ensure(range.start_relative() == Some(Interval::new(1, IntervalUnit::Hours)), "Expected 1h start")?;
    ensure(range.is_valid(), "Expected valid range")?;
    Ok(())
}

/// Tests custom defaults for new bounds.
#[test]
fn custom_defaults_drive_new_bounds() -> TestResult {
    let defaults = TimeRangeDefaults {
        start_relative: Interval::new(30, IntervalUnit::Minutes),
        end_relative: Interval::new(10, IntervalUnit::Seconds),
    };
    let mut range = TimeRange::new(defaults);
    range.set_mode(Endpoint::Start, BoundMode::Absolute, NOW)?;
    ensure(range.start_absolute() == Some(UnixMillis::new(NOW.as_i64() - 1_800_000)), "Expected now minus 30m")?;
    range.set_mode(Endpoint::End, BoundMode::Relative, NOW)?;
    ensure(range.end_relative() == Some(defaults.end_relative), "Expected custom end")?;
    ensure(range.defaults() == defaults, "Expected defaults retained")?;
    Ok(())
}

/// Tests reading from and writing back to a query.
#[test]
fn query_round_trip() -> TestResult {
    let query: TimeSeriesQuery = serde_json::from_str(
        r#"{"start_absolute": "2024-01-01T00:00:00Z", "end_relative": {"value": 5, "unit": "minutes"}, "metrics": []}"#,
    )?;
    let mut range = TimeRange::from_query(&query, TimeRangeDefaults::default());
    ensure(range.is_valid(), "Expected valid range from query")?;
    ensure(range.start_mode() == BoundMode::Absolute, "Expected absolute start mode")?;
    ensure(range.end_mode() == BoundMode::Relative, "Expected relative end mode")?;
    ensure(range.start_absolute() == Some(UnixMillis::new(1_704_067_200_000)), "Expected decoded instant")?;

    range.set_mode(Endpoint::End, BoundMode::None, NOW)?;
    let mut updated = query.clone();
    range.apply_to(&mut updated);
    ensure(updated.end_relative.is_none() && updated.end_absolute.is_none(), "Expected end removed")?;
    ensure(updated.start_absolute == query.start_absolute, "Expected start unchanged")?;
    Ok(())
}
