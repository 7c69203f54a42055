// crates/formwork-core/tests/interval.rs
// ============================================================================
// Test Module: Interval Normalizer
// Coverage: Short-code parsing, fractional conversion, long forms, wire shape.
// ============================================================================
//! ## Overview
//! Integration tests for interval parsing and formatting.

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

use formwork_core::Interval;
use formwork_core::IntervalError;
use formwork_core::IntervalUnit;
use formwork_core::format_interval;
use formwork_core::parse_interval;
use formwork_core::to_long_form;
use proptest::prelude::*;
use serde_json::json;
use support::TestResult;
use support::ensure;

/// Tests the documented parse examples.
#[test]
fn parses_short_codes() -> TestResult {
    ensure(parse_interval("5m")? == Interval::new(5, IntervalUnit::Minutes), "Expected minutes")?;
    ensure(parse_interval("5ms")? == Interval::new(5, IntervalUnit::Milliseconds), "Expected milliseconds")?;
    ensure(parse_interval("1.5h")? == Interval::new(5_400_000, IntervalUnit::Milliseconds), "Expected ms")?;
    ensure(parse_interval("3M")? == Interval::new(3, IntervalUnit::Months), "Expected months")?;
    ensure(parse_interval(" 2w ")? == Interval::new(2, IntervalUnit::Weeks), "Expected trimmed input")?;
    ensure(parse_interval("0.25s")? == Interval::new(250, IntervalUnit::Milliseconds), "Expected 250ms")?;
    Ok(())
}

/// Tests rejected inputs.
#[test]
fn rejects_malformed_text() -> TestResult {
    for input in ["bogus", "", "5", "m", "5x", "5 m", "-5m", "1.5ms", "1.m", "1..5h", "5mm", "5H"] {
        let result = parse_interval(input);
        ensure(
            matches!(result, Err(IntervalError::Format { .. })),
            format!("Expected format error for `{input}`, got {result:?}"),
        )?;
    }
    let message = parse_interval("bogus").err().map(|err| err.to_string()).unwrap_or_default();
    ensure(message.contains("ms, s, m, h, d, w, M, y"), "Expected accepted codes in message")?;
    Ok(())
}

/// Tests formatting and long forms.
#[test]
fn formats_short_and_long_forms() -> TestResult {
    let five_minutes = Interval::new(5, IntervalUnit::Minutes);
    ensure(format_interval(&five_minutes) == "5m", "Expected short form")?;
    ensure(to_long_form(&five_minutes) == "5 minutes", "Expected plural")?;
    ensure(to_long_form(&Interval::new(1, IntervalUnit::Hours)) == "1 hour", "Expected singular")?;
    ensure(five_minutes.to_string() == "5m", "Expected display")?;
    ensure("2d".parse::<Interval>()? == Interval::new(2, IntervalUnit::Days), "Expected FromStr")?;
    Ok(())
}

/// Tests the structured wire form with long unit names.
#[test]
fn wire_form_uses_long_unit_names() -> TestResult {
    let interval = Interval::new(90, IntervalUnit::Seconds);
    ensure(serde_json::to_value(interval)? == json!({"value": 90, "unit": "seconds"}), "Expected wire form")?;
    let decoded: Interval = serde_json::from_value(json!({"value": 1, "unit": "years"}))?;
    ensure(decoded == Interval::new(1, IntervalUnit::Years), "Expected decoded interval")?;
    ensure("Hour".parse::<IntervalUnit>()? == IntervalUnit::Hours, "Expected singular long name")?;
    ensure("M".parse::<IntervalUnit>()? == IntervalUnit::Months, "Expected code fallback")?;
    ensure("fortnights".parse::<IntervalUnit>().is_err(), "Expected unknown unit")?;
    Ok(())
}

proptest! {
    /// Tests that every integer interval survives format then parse.
    #[test]
    fn format_then_parse_is_identity(value in 0_u64 .. 1_000_000_000, index in 0_usize .. 8) {
        let interval = Interval::new(value, IntervalUnit::ALL[index]);
        prop_assert_eq!(parse_interval(&format_interval(&interval)), Ok(interval));
    }

    /// Tests that fractional input rounds to the nearest millisecond.
    #[test]
    fn fractional_seconds_round_to_millis(whole in 0_u64 .. 10_000, thousandths in 0_u64 .. 1_000, extra in 1_u64 .. 10) {
        let text = format!("{whole}.{thousandths:03}{extra}s");
        let expected = whole * 1_000 + thousandths + u64::from(extra >= 5);
        prop_assert_eq!(parse_interval(&text), Ok(Interval::new(expected, IntervalUnit::Milliseconds)));
    }
}
