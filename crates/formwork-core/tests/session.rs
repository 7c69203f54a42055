// crates/formwork-core/tests/session.rs
// ============================================================================
// Test Module: Edit Sessions
// Coverage: Field edits, activity toggles, variant switches, audit events.
// ============================================================================
//! ## Overview
//! Integration tests for editing one instance through an [`EditSession`].
//!
//! [`EditSession`]: formwork_core::EditSession

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

use formwork_core::DescriptorCatalog;
use formwork_core::EditAuditKind;
use formwork_core::EditSession;
use formwork_core::Instance;
use formwork_core::MemoryAuditSink;
use formwork_core::ProcessorDescriptor;
use formwork_core::PropertyDescriptor;
use formwork_core::PropertyType;
use formwork_core::SessionError;
use formwork_core::ValidationOptions;
use serde_json::json;
use support::TestResult;
use support::aggregator_catalog;
use support::ensure;

/// Tests that opening validates active fields and reports messages.
#[test]
fn open_validates_active_fields() -> TestResult {
    let catalog = aggregator_catalog();
    let audit = MemoryAuditSink::new();
    let mut instance = Instance::new("avg");
    instance.set("sampling.value", json!(0));
    let session = EditSession::open(Some(&catalog), &instance, ValidationOptions::default(), &audit);

    ensure(!session.is_valid(), "Expected invalid session")?;
    ensure(
        session.errors() == vec![("sampling.value".to_string(), "sampling value must be positive".to_string())],
        format!("Unexpected errors: {:?}", session.errors()),
    )?;
    ensure(audit.kinds() == vec![EditAuditKind::FieldInvalid], "Expected one field_invalid event")?;
    let event = audit.events().into_iter().next().ok_or("missing event")?;
    ensure(event.field.as_deref() == Some("sampling.value"), "Expected field key in event")?;
    ensure(event.variant.as_deref() == Some("avg"), "Expected variant in event")?;
    Ok(())
}

/// Tests coercion and validation of text edits.
#[test]
fn set_text_coerces_and_validates() -> TestResult {
    let catalog = aggregator_catalog();
    let audit = MemoryAuditSink::new();
    let mut session = EditSession::open(Some(&catalog), &Instance::new("avg"), ValidationOptions::default(), &audit);
    ensure(session.is_valid(), "Expected defaults to be valid")?;

    ensure(session.set_text("sampling.value", "15")?, "Expected numeric text to pass")?;
    let view = session.field("sampling.value").ok_or("missing field")?;
    ensure(view.value == json!(15), "Expected coerced number")?;

    ensure(!session.set_text("sampling.value", "abc")?, "Expected text to fail")?;
    let view = session.field("sampling.value").ok_or("missing field")?;
    ensure(view.error == "value must be a long integer", format!("Unexpected error: {}", view.error))?;

    ensure(session.set_text("sampling.value", "30")?, "Expected recovery")?;
    ensure(session.is_valid(), "Expected valid session after recovery")?;
    let committed = session.commit();
    ensure(committed.get("sampling.value") == Some(&json!(30)), "Expected committed value")?;
    ensure(audit.kinds().last() == Some(&EditAuditKind::InstanceCommitted), "Expected commit event")?;
    Ok(())
}

/// Tests activity toggles for optional and required fields.
#[test]
fn set_active_respects_required_fields() -> TestResult {
    let catalog = aggregator_catalog();
    let audit = MemoryAuditSink::new();
    let mut session = EditSession::open(Some(&catalog), &Instance::new("avg"), ValidationOptions::default(), &audit);

    ensure(
        session.set_active("sampling.value", false) == Err(SessionError::RequiredField {
            key: "sampling.value".to_string(),
        }),
        "Expected required field rejection",
    )?;
    ensure(
        matches!(session.set_active("missing", true), Err(SessionError::UnknownField { .. })),
        "Expected unknown field",
    )?;

    session.set_active("align_sampling", true)?;
    ensure(session.commit().get("align_sampling") == Some(&json!(true)), "Expected default committed")?;
    session.set_active("align_sampling", false)?;
    ensure(!session.commit().contains("align_sampling"), "Expected field removed")?;

    session.set_value("comment", json!("note"))?;
    ensure(session.field("comment").is_some_and(|view| view.active), "Expected edit to activate")?;
    Ok(())
}

/// Tests variant switching inside a session.
#[test]
fn switch_variant_reprojects() -> TestResult {
    let catalog = aggregator_catalog();
    let audit = MemoryAuditSink::new();
    let mut instance = Instance::new("avg");
    instance.set("sampling.value", json!(7));
    instance.set("comment", json!("note"));
    let mut session = EditSession::open(Some(&catalog), &instance, ValidationOptions::default(), &audit);

    session.switch_variant("percentile");
    ensure(session.name() == "percentile", "Expected new variant")?;
    ensure(session.field("comment").is_none(), "Expected stale field gone")?;
    ensure(session.field("sampling.value").is_some_and(|view| view.value == json!(7)), "Expected shared value")?;
    ensure(!session.is_valid(), "Expected empty required percentile to be invalid")?;

    ensure(session.set_text("percentile", "0.95")?, "Expected percentile to pass")?;
    ensure(!session.set_text("percentile", "1.5")?, "Expected rule failure")?;
    let kinds = audit.kinds();
    ensure(kinds.contains(&EditAuditKind::VariantSwitched), "Expected switch event")?;
    Ok(())
}

/// Tests that unknown variants and missing catalogs degrade to empty views.
#[test]
fn schema_mismatch_degrades() -> TestResult {
    let catalog = aggregator_catalog();
    let audit = MemoryAuditSink::new();
    let session = EditSession::open(Some(&catalog), &Instance::new("median"), ValidationOptions::default(), &audit);
    ensure(session.views().is_empty(), "Expected no views")?;
    ensure(session.is_valid(), "Expected nothing to be invalid")?;
    ensure(audit.kinds() == vec![EditAuditKind::SchemaMismatch], "Expected schema_mismatch event")?;
    ensure(session.commit() == Instance::new("median"), "Expected empty instance")?;

    let quiet = MemoryAuditSink::new();
    let absent = EditSession::open(None, &Instance::new("avg"), ValidationOptions::default(), &quiet);
    ensure(absent.views().is_empty(), "Expected no views without catalog")?;
    ensure(quiet.kinds().is_empty(), "Expected no mismatch without catalog")?;
    Ok(())
}

/// Tests that suppressed rule faults are audited.
#[test]
fn suppressed_faults_are_audited() -> TestResult {
    let catalog = DescriptorCatalog::new(vec![ProcessorDescriptor::new(
        "filter",
        vec![PropertyDescriptor::new("pattern", PropertyType::String).with_rule("value.size > 1", "broken")],
    )]);
    let audit = MemoryAuditSink::new();
    let mut session =
        EditSession::open(Some(&catalog), &Instance::new("filter"), ValidationOptions::default(), &audit);
    ensure(session.set_text("pattern", "abc")?, "Expected fail-open pass")?;
    ensure(audit.kinds().contains(&EditAuditKind::RuleFaultSuppressed), "Expected suppressed fault event")?;
    Ok(())
}
