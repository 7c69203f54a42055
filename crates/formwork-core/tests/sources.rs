// crates/formwork-core/tests/sources.rs
// ============================================================================
// Test Module: Catalog Sources, Suggestions, and Audit Sinks
// Coverage: File and in-memory catalogs, degradation, suggestion caching.
// ============================================================================
//! ## Overview
//! Integration tests for the collaborator seams of the form engine.

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

use std::cell::Cell;
use std::fs;

use formwork_core::CatalogError;
use formwork_core::CatalogId;
use formwork_core::CatalogSource;
use formwork_core::EditAuditEvent;
use formwork_core::EditAuditKind;
use formwork_core::EditAuditSink;
use formwork_core::FileAuditSink;
use formwork_core::FileCatalogSource;
use formwork_core::InMemoryCatalogSource;
use formwork_core::MemoryAuditSink;
use formwork_core::NoopAuditSink;
use formwork_core::SuggestionCache;
use formwork_core::SuggestionError;
use formwork_core::SuggestionSource;
use formwork_core::load_catalog_or_absent;
use serde_json::Value;
use support::TestResult;
use support::aggregator_catalog;
use support::ensure;

/// Catalog payload used for file-backed tests.
const CATALOG_JSON: &str = r#"[{"name": "count", "properties": [{"name": "limit", "type": "integer"}]}]"#;

/// Suggestion source counting lookups and optionally failing.
struct CountingSource {
    /// Number of lookups served.
    calls: Cell<usize>,
    /// Fail every lookup when set.
    fail: bool,
}

impl CountingSource {
    /// Creates a source.
    const fn new(fail: bool) -> Self {
        Self {
            calls: Cell::new(0),
            fail,
        }
    }
}

impl SuggestionSource for CountingSource {
    fn suggest(&self, entity: &str, hint: &str) -> Result<Vec<String>, SuggestionError> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            return Err(SuggestionError::Source("backend offline".to_string()));
        }
        Ok(vec![format!("{entity}.{hint}.Host"), "datacenter".to_string(), "HOSTNAME".to_string()])
    }
}

/// Tests loading catalogs from a directory.
#[test]
fn file_source_reads_catalogs() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("aggregators.json"), CATALOG_JSON)?;
    let source = FileCatalogSource::new(dir.path());

    let catalog = source.fetch_catalog(&CatalogId::new("aggregators"))?;
    ensure(catalog.find("count").is_some(), "Expected decoded variant")?;

    let missing = source.fetch_catalog(&CatalogId::new("group_by"));
    ensure(matches!(missing, Err(CatalogError::NotFound(_))), "Expected missing catalog")?;

    let escaping = source.fetch_catalog(&CatalogId::new("../aggregators"));
    ensure(matches!(escaping, Err(CatalogError::NotFound(_))), "Expected unsafe id rejection")?;
    Ok(())
}

/// Tests the size limit and decode failures of file catalogs.
#[test]
fn file_source_rejects_oversize_and_malformed() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("big.json"), CATALOG_JSON)?;
    fs::write(dir.path().join("broken.json"), "{not json")?;
    let source = FileCatalogSource::new(dir.path()).with_max_bytes(16);

    match source.fetch_catalog(&CatalogId::new("big")) {
        Err(CatalogError::Source(message)) => {
            ensure(message.contains("exceeds size limit"), format!("Unexpected message: {message}"))?;
        }
        other => return Err(format!("expected size failure, got {other:?}").into()),
    }
    let broken = FileCatalogSource::new(dir.path()).fetch_catalog(&CatalogId::new("broken"));
    ensure(matches!(broken, Err(CatalogError::Decode(_))), "Expected decode failure")?;
    Ok(())
}

/// Tests in-memory catalogs and degradation to an absent catalog.
#[test]
fn missing_catalog_degrades_with_audit() -> TestResult {
    let source = InMemoryCatalogSource::new().with_catalog("aggregators", aggregator_catalog());
    let audit = MemoryAuditSink::new();

    let found = load_catalog_or_absent(&source, &CatalogId::new("aggregators"), &audit);
    ensure(found.is_some(), "Expected catalog")?;
    ensure(audit.kinds().is_empty(), "Expected no events on success")?;

    let absent = load_catalog_or_absent(&source, &CatalogId::new("group_by"), &audit);
    ensure(absent.is_none(), "Expected absent catalog")?;
    ensure(audit.kinds() == vec![EditAuditKind::CatalogUnavailable], "Expected catalog_unavailable")?;
    let message = audit.events().into_iter().next().and_then(|event| event.message).unwrap_or_default();
    ensure(message.starts_with("group_by:"), format!("Unexpected message: {message}"))?;
    Ok(())
}

/// Tests that suggestion lists are cached and filtered per keystroke.
#[test]
fn suggestions_are_cached_and_filtered() -> TestResult {
    let source = CountingSource::new(false);
    let mut cache = SuggestionCache::new();

    let all = cache.suggest(&source, "cpu", "tags", "", &NoopAuditSink);
    ensure(all.len() == 3, format!("Expected every suggestion, got {all:?}"))?;
    let hosts = cache.suggest(&source, "cpu", "tags", " host ", &NoopAuditSink);
    ensure(hosts == vec!["cpu.tags.Host".to_string(), "HOSTNAME".to_string()], format!("Got {hosts:?}"))?;
    ensure(source.calls.get() == 1, "Expected a single lookup")?;

    cache.suggest(&source, "mem", "tags", "", &NoopAuditSink);
    ensure(cache.len() == 2 && cache.contains("mem", "tags"), "Expected two cached lists")?;
    ensure(cache.invalidate(Some("cpu")) == 1, "Expected one list dropped")?;
    ensure(!cache.contains("cpu", "tags"), "Expected cpu list gone")?;
    ensure(cache.invalidate(None) == 1 && cache.is_empty(), "Expected cache cleared")?;
    Ok(())
}

/// Tests that failed lookups yield nothing, are audited, and are retried.
#[test]
fn failed_suggestions_are_not_cached() -> TestResult {
    let source = CountingSource::new(true);
    let audit = MemoryAuditSink::new();
    let mut cache = SuggestionCache::new();

    ensure(cache.suggest(&source, "cpu", "tags", "h", &audit).is_empty(), "Expected no suggestions")?;
    ensure(cache.suggest(&source, "cpu", "tags", "h", &audit).is_empty(), "Expected no suggestions")?;
    ensure(source.calls.get() == 2, "Expected failure to be retried")?;
    ensure(cache.is_empty(), "Expected nothing cached")?;
    let event = audit.events().into_iter().next().ok_or("missing event")?;
    ensure(event.event == EditAuditKind::SuggestionsFailed, "Expected suggestions_failed")?;
    ensure(event.variant.as_deref() == Some("cpu") && event.field.as_deref() == Some("tags"), "Expected keys")?;
    Ok(())
}

/// Tests that the file audit sink appends JSON lines.
#[test]
fn file_audit_sink_writes_json_lines() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("audit.log");
    let sink = FileAuditSink::new(&path)?;
    sink.record(&EditAuditEvent::new(EditAuditKind::FieldInvalid).with_variant("avg").with_field("sampling.value"));
    sink.record(&EditAuditEvent::new(EditAuditKind::InstanceCommitted).with_variant("avg"));

    let content = fs::read_to_string(&path)?;
    let lines: Vec<Value> = content.lines().map(serde_json::from_str).collect::<Result<_, _>>()?;
    ensure(lines.len() == 2, "Expected two lines")?;
    ensure(lines[0]["event"] == "field_invalid", "Expected snake_case event name")?;
    ensure(lines[0]["field"] == "sampling.value", "Expected field")?;
    ensure(lines[1].get("field").is_none(), "Expected absent field to be omitted")?;
    ensure(lines[1]["timestamp_ms"].is_u64(), "Expected numeric timestamp")?;
    Ok(())
}
