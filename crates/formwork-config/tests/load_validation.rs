//! Config load validation tests for formwork-config.
// crates/formwork-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use formwork_config::FormworkConfig;
use formwork_config::config_toml_example;
use formwork_core::RuleErrorPolicy;
use tempfile::NamedTempFile;

mod common;

use common::TestResult;
use common::assert_invalid;

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(FormworkConfig::load(Some(path)), "config path exceeds max length")
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(FormworkConfig::load(Some(path)), "config path component too long")
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'a'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(FormworkConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(FormworkConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_rejects_missing_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    assert_invalid(FormworkConfig::load(Some(&path)), "config io error")
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(b"[validation\nrule_error_policy = 1").map_err(|err| err.to_string())?;
    assert_invalid(FormworkConfig::load(Some(file.path())), "config parse error")
}

#[test]
fn load_reads_valid_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(b"[validation]\nrule_error_policy = \"fail_closed\"\n")
        .map_err(|err| err.to_string())?;
    let config = FormworkConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.validation.rule_error_policy != RuleErrorPolicy::FailClosed {
        return Err("expected fail_closed policy".to_string());
    }
    Ok(())
}

#[test]
fn example_config_loads() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(config_toml_example().as_bytes()).map_err(|err| err.to_string())?;
    let config = FormworkConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.catalogs.aggregators.as_deref() != Some("catalogs/aggregators.json") {
        return Err("expected aggregator catalog path".to_string());
    }
    Ok(())
}
