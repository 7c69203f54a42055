// crates/formwork-core/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared result helpers and catalog fixtures for form engine tests.
// ============================================================================
//! ## Overview
//! Shared test helpers for consistent Result-based assertions.

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
    dead_code,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::error::Error;
use std::fmt;

use formwork_core::DescriptorCatalog;
use formwork_core::ProcessorDescriptor;
use formwork_core::PropertyDescriptor;
use formwork_core::PropertyType;

// ========================================================================
// Test Result Helpers
// ========================================================================

/// Standard result type used across form engine integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

/// Lightweight error type for test assertions.
#[derive(Debug)]
struct TestError {
    /// Human-readable failure message.
    message: String,
}

impl fmt::Display for TestError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)
    }
}

impl Error for TestError {}

/// Returns an error when a test condition fails.
///
/// # Errors
/// Returns a `TestError` when the condition is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition {
        Ok(())
    } else {
        Err(Box::new(TestError {
            message: message.into(),
        }))
    }
}

// ========================================================================
// Catalog Fixtures
// ========================================================================

/// Aggregator catalog with a nested sampling object, an optional flag, and
/// a second variant sharing the sampling group.
pub fn aggregator_catalog() -> DescriptorCatalog {
    let sampling = || {
        PropertyDescriptor::new("sampling", PropertyType::Object).with_children(vec![
            PropertyDescriptor::new("value", PropertyType::Long)
                .with_default(1)
                .with_rule("value > 0", "sampling value must be positive"),
            PropertyDescriptor::new("unit", PropertyType::Enum)
                .with_options(["Milliseconds", "Seconds", "Minutes", "Hours"])
                .with_default("minutes"),
        ])
    };
    DescriptorCatalog::new(vec![
        ProcessorDescriptor::new(
            "avg",
            vec![
                sampling(),
                PropertyDescriptor::new("align_sampling", PropertyType::Boolean)
                    .optional()
                    .with_default("true"),
                PropertyDescriptor::new("comment", PropertyType::String).optional(),
            ],
        ),
        ProcessorDescriptor::new(
            "percentile",
            vec![
                sampling(),
                PropertyDescriptor::new("percentile", PropertyType::Double)
                    .with_rule("value > 0 && value <= 1", "percentile must be in (0, 1]"),
            ],
        ),
    ])
}

/// Group-by catalog with a tag list and a bucketed value grouping.
pub fn group_by_catalog() -> DescriptorCatalog {
    DescriptorCatalog::new(vec![
        ProcessorDescriptor::new(
            "tag",
            vec![
                PropertyDescriptor::new("tags", PropertyType::Array)
                    .with_rule("value.length >= 1", "at least one tag is required"),
            ],
        ),
        ProcessorDescriptor::new(
            "value",
            vec![PropertyDescriptor::new("range_size", PropertyType::Integer).with_default("10")],
        ),
    ])
}
