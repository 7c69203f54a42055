// crates/formwork-core/tests/projection.rs
// ============================================================================
// Test Module: Schema Projection Engine
// Coverage: Project/commit round trip, defaults, variant switching, catalogs.
// ============================================================================
//! ## Overview
//! Integration tests for projecting instances against descriptor catalogs.

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

use formwork_core::CatalogError;
use formwork_core::DescriptorCatalog;
use formwork_core::Instance;
use formwork_core::ProcessorDescriptor;
use formwork_core::PropertyDescriptor;
use formwork_core::PropertyType;
use formwork_core::commit;
use formwork_core::default_value_for;
use formwork_core::project;
use formwork_core::switch_variant;
use proptest::prelude::*;
use serde_json::json;
use support::TestResult;
use support::aggregator_catalog;
use support::ensure;

/// Tests that absent optional fields project inactive with their default.
#[test]
fn absent_optional_fields_are_inactive_with_defaults() -> TestResult {
    let catalog = aggregator_catalog();
    let views = project(Some(&catalog), &Instance::new("avg"));
    ensure(views.len() == 4, format!("Expected four views, got {}", views.len()))?;
    for view in &views {
        ensure(view.active != view.descriptor.optional, format!("Unexpected activity for {}", view.name()))?;
        ensure(view.value == default_value_for(&view.descriptor), format!("Expected default for {}", view.name()))?;
        ensure(view.error.is_empty(), "Expected no error after projection")?;
    }
    let align = views.iter().find(|view| view.name() == "align_sampling").ok_or("missing align_sampling")?;
    ensure(align.value == json!(true), "Expected boolean default")?;
    let unit = views.iter().find(|view| view.name() == "unit").ok_or("missing unit")?;
    ensure(unit.value == json!("Minutes"), "Expected canonical enum default")?;
    ensure(unit.parent_name.as_deref() == Some("sampling"), "Expected parent name")?;
    Ok(())
}

/// Tests that stored values win over defaults and mark fields active.
#[test]
fn stored_values_mark_fields_active() -> TestResult {
    let catalog = aggregator_catalog();
    let mut instance = Instance::new("avg");
    instance.set("sampling.value", json!(5));
    instance.set("comment", json!("hourly"));
    let views = project(Some(&catalog), &instance);
    let comment = views.iter().find(|view| view.name() == "comment").ok_or("missing comment")?;
    ensure(comment.active && comment.value == json!("hourly"), "Expected stored comment")?;
    let value = views.iter().find(|view| view.effective_key() == "sampling.value").ok_or("missing value")?;
    ensure(value.value == json!(5), "Expected stored nested value")?;
    Ok(())
}

/// Tests that commit writes required defaults and omits inactive fields.
#[test]
fn commit_writes_active_fields_only() -> TestResult {
    let catalog = aggregator_catalog();
    let committed = commit("avg", &project(Some(&catalog), &Instance::new("avg")));
    let expected: Instance = serde_json::from_value(json!({
        "name": "avg",
        "sampling": {"value": 1, "unit": "Minutes"}
    }))?;
    ensure(committed == expected, format!("Unexpected commit: {committed:?}"))?;
    Ok(())
}

/// Tests that switching variants drops stale keys and keeps shared ones.
#[test]
fn switch_variant_drops_stale_keys() -> TestResult {
    let catalog = aggregator_catalog();
    let mut instance = Instance::new("avg");
    instance.set("sampling.value", json!(5));
    instance.set("align_sampling", json!(false));
    instance.set("comment", json!("note"));

    let switched = switch_variant(Some(&catalog), &instance, "percentile");
    ensure(switched.name == "percentile", "Expected new name")?;
    ensure(switched.get("sampling.value") == Some(&json!(5)), "Expected shared key kept")?;
    ensure(!switched.contains("align_sampling"), "Expected stale flag dropped")?;
    ensure(!switched.contains("comment"), "Expected stale comment dropped")?;
    ensure(switched.contains("percentile"), "Expected new required key")?;

    let unknown = switch_variant(Some(&catalog), &instance, "median");
    ensure(unknown.name == "median" && unknown.fields.is_empty(), "Expected empty instance")?;
    Ok(())
}

/// Tests that missing catalogs and unknown variants project to nothing.
#[test]
fn schema_mismatch_projects_empty() -> TestResult {
    let catalog = aggregator_catalog();
    ensure(project(None, &Instance::new("avg")).is_empty(), "Expected empty without catalog")?;
    ensure(project(Some(&DescriptorCatalog::default()), &Instance::new("avg")).is_empty(), "Expected empty")?;
    ensure(project(Some(&catalog), &Instance::new("sum")).is_empty(), "Expected empty for unknown variant")?;
    Ok(())
}

/// Tests decoding a camelCase catalog with case-insensitive type names.
#[test]
fn catalog_decodes_wire_shape() -> TestResult {
    let bytes = br#"[{
        "name": "limit",
        "label": "Limit",
        "properties": [
            {"name": "count", "type": "INTEGER", "defaultValue": "3",
             "validations": [{"expression": "value > 0", "message": "positive"}]},
            {"name": "mode", "type": "enum", "options": ["First", "Last"], "optional": true}
        ]
    }]"#;
    let catalog = DescriptorCatalog::from_json_slice(bytes)?;
    let variant = catalog.find("limit").ok_or("missing variant")?;
    let count = variant.property("count").ok_or("missing count")?;
    ensure(count.property_type == PropertyType::Integer, "Expected integer type")?;
    ensure(count.validations[0].rule_kind == "expr", "Expected default rule kind")?;
    ensure(count.validations[0].is_expression_kind(), "Expected expression kind")?;

    let unknown_type = DescriptorCatalog::from_json_slice(br#"[{"name": "x", "properties": [{"name": "a", "type": "map"}]}]"#);
    ensure(matches!(unknown_type, Err(CatalogError::Decode(_))), "Expected unknown type to fail decoding")?;
    Ok(())
}

/// Tests structural catalog rules.
#[test]
fn catalog_validation_rejects_structural_violations() -> TestResult {
    let field = |name: &str| PropertyDescriptor::new(name, PropertyType::String);
    let cases = [
        (
            DescriptorCatalog::new(vec![ProcessorDescriptor::new("a", vec![]), ProcessorDescriptor::new("a", vec![])]),
            "duplicate variant",
        ),
        (DescriptorCatalog::new(vec![ProcessorDescriptor::new("a", vec![field("x"), field("x")])]), "duplicate property"),
        (DescriptorCatalog::new(vec![ProcessorDescriptor::new("a", vec![field("name")])]), "collides"),
        (DescriptorCatalog::new(vec![ProcessorDescriptor::new("a", vec![field("a.b")])]), "must not contain"),
        (
            DescriptorCatalog::new(vec![ProcessorDescriptor::new(
                "a",
                vec![PropertyDescriptor::new("outer", PropertyType::Object)
                    .with_children(vec![PropertyDescriptor::new("inner", PropertyType::Object)])],
            )]),
            "nests an object",
        ),
        (
            DescriptorCatalog::new(vec![ProcessorDescriptor::new("a", vec![field("x").with_children(vec![field("y")])])]),
            "not an object",
        ),
    ];
    for (catalog, needle) in cases {
        match catalog.validate() {
            Err(CatalogError::Invalid(message)) => {
                ensure(message.contains(needle), format!("Expected `{needle}` in `{message}`"))?;
            }
            other => return Err(format!("expected invalid catalog for `{needle}`, got {other:?}").into()),
        }
    }
    ensure(aggregator_catalog().validate().is_ok(), "Expected fixture catalog to be valid")?;
    let nested_name = DescriptorCatalog::new(vec![ProcessorDescriptor::new(
        "a",
        vec![PropertyDescriptor::new("group", PropertyType::Object).with_children(vec![field("name")])],
    )]);
    ensure(nested_name.validate().is_ok(), "Expected nested `name` to be allowed")?;
    Ok(())
}

proptest! {
    /// Tests that commit(project(i)) reproduces every active key of i and
    /// introduces no undeclared key.
    #[test]
    fn commit_after_project_preserves_active_keys(
        value in proptest::option::of(1_i64 .. 100_000),
        unit in proptest::option::of(proptest::sample::select(vec!["Seconds", "Minutes", "Hours"])),
        align in proptest::option::of(any::<bool>()),
        comment in proptest::option::of("[a-z ]{0,12}"),
    ) {
        let catalog = aggregator_catalog();
        let variant = catalog.find("avg").unwrap();
        let mut instance = Instance::new("avg");
        if let Some(value) = value {
            instance.set("sampling.value", json!(value));
        }
        if let Some(unit) = unit {
            instance.set("sampling.unit", json!(unit));
        }
        if let Some(align) = align {
            instance.set("align_sampling", json!(align));
        }
        if let Some(comment) = comment {
            instance.set("comment", json!(comment));
        }

        let committed = commit(&instance.name, &project(Some(&catalog), &instance));
        for path in instance.paths() {
            prop_assert_eq!(committed.get(&path), instance.get(&path));
        }
        prop_assert!(committed.unknown_paths(variant).is_empty());
        prop_assert_eq!(&committed, &commit(&committed.name, &project(Some(&catalog), &committed)));
    }
}
