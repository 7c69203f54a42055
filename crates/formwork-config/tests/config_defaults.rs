//! Config defaults and section validation tests for formwork-config.
// crates/formwork-config/tests/config_defaults.rs
// =============================================================================
// Module: Config Defaults and Section Validation Tests
// Description: Validate default behavior and per-section invariants.
// Purpose: Ensure minimal config is valid and section rules are enforced.
// =============================================================================

use formwork_config::AuditSinkKind;
use formwork_config::FormworkConfig;
use formwork_config::MAX_EXPRESSION_BYTES;
use formwork_core::Interval;
use formwork_core::IntervalUnit;
use formwork_core::RuleErrorPolicy;
use formwork_core::TimeRangeDefaults;

mod common;

use common::TestResult;
use common::assert_invalid;

#[test]
fn default_config_validates() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    if config != FormworkConfig::default() {
        return Err("empty file should equal the default config".to_string());
    }
    Ok(())
}

#[test]
fn defaults_match_engine_defaults() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    let options = config.validation.options();
    if options.rule_error_policy != RuleErrorPolicy::FailOpen {
        return Err("rule_error_policy should default to fail_open".to_string());
    }
    if options.limits != rule_expr::ParseLimits::default() {
        return Err("expression limits should match parser defaults".to_string());
    }
    let defaults = config.time_range.defaults().map_err(|err| err.to_string())?;
    if defaults != TimeRangeDefaults::default() {
        return Err("time range defaults should be 1h and 1m".to_string());
    }
    if config.audit.sink != AuditSinkKind::None {
        return Err("audit sink should default to none".to_string());
    }
    Ok(())
}

#[test]
fn expression_limits_are_bounded() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.validation.max_expression_bytes = MAX_EXPRESSION_BYTES + 1;
    assert_invalid(config.validate(), "validation.max_expression_bytes must be between")?;
    config.validation.max_expression_bytes = MAX_EXPRESSION_BYTES;
    config.validation.max_expression_depth = 0;
    assert_invalid(config.validate(), "validation.max_expression_depth must be between")
}

#[test]
fn time_range_defaults_are_parsed() -> TestResult {
    let config = common::config_from_toml(
        "[time_range]\ndefault_start_relative = \"90m\"\ndefault_end_relative = \"5s\"\n",
    )
    .map_err(|err| err.to_string())?;
    let defaults = config.time_range.defaults().map_err(|err| err.to_string())?;
    if defaults.start_relative != Interval::new(90, IntervalUnit::Minutes)
        || defaults.end_relative != Interval::new(5, IntervalUnit::Seconds)
    {
        return Err("unexpected time range defaults".to_string());
    }
    Ok(())
}

#[test]
fn time_range_rejects_bad_intervals() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.time_range.default_start_relative = "soon".to_string();
    assert_invalid(config.validate(), "time_range.default_start_relative")?;
    config.time_range.default_start_relative = "1h".to_string();
    config.time_range.default_end_relative = "0m".to_string();
    assert_invalid(config.validate(), "time_range.default_end_relative must be greater than zero")
}

#[test]
fn file_audit_sink_requires_path() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.audit.sink = AuditSinkKind::File;
    assert_invalid(config.validate(), "audit.sink=file requires audit.path")?;
    config.audit.path = Some("  ".to_string());
    assert_invalid(config.validate(), "audit.path must be non-empty")?;
    config.audit.sink = AuditSinkKind::Stderr;
    config.audit.path = Some("audit.log".to_string());
    assert_invalid(config.validate(), "audit.path is only allowed with audit.sink=file")
}

#[test]
fn file_audit_sink_builds() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("audit.log");
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.audit.sink = AuditSinkKind::File;
    config.audit.path = Some(path.to_string_lossy().into_owned());
    config.audit.build_sink().map_err(|err| err.to_string())?;
    if !path.exists() {
        return Err("audit file should be created".to_string());
    }
    Ok(())
}

#[test]
fn catalog_paths_are_validated() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.catalogs.group_by = Some(String::new());
    assert_invalid(config.validate(), "catalogs.group_by must be non-empty")?;
    config.catalogs.group_by = Some(" catalogs/group_by.json ".to_string());
    config.validate().map_err(|err| err.to_string())?;
    if config.catalogs.group_by_path().as_deref() != Some(std::path::Path::new("catalogs/group_by.json")) {
        return Err("catalog path should be trimmed".to_string());
    }
    Ok(())
}

#[test]
fn unknown_policy_is_a_parse_error() -> TestResult {
    assert_invalid(
        FormworkConfig::from_toml_str("[validation]\nrule_error_policy = \"ignore\"\n"),
        "config parse error",
    )
}
