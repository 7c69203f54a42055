// crates/formwork-core/src/audit.rs
// ============================================================================
// Module: Formwork Edit Audit
// Description: Structured audit events for form editing.
// Purpose: Emit JSON-line edit events without a logging framework dependency.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Editing never fails because of auditing. Sinks swallow serialization and
//! I/O errors; callers route events to stderr, an append-only file, or
//! nowhere. [`MemoryAuditSink`] keeps events for inspection in tests and
//! tooling.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Edit event classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditAuditKind {
    /// Catalog fetch failed; projections degrade to empty.
    CatalogUnavailable,
    /// Instance names a variant missing from the catalog.
    SchemaMismatch,
    /// A field value failed validation.
    FieldInvalid,
    /// A faulty rule was treated as passing.
    RuleFaultSuppressed,
    /// The instance moved to another variant.
    VariantSwitched,
    /// Views were committed back into an instance.
    InstanceCommitted,
    /// Suggestion lookup failed.
    SuggestionsFailed,
}

/// Edit audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditAuditEvent {
    /// Event identifier.
    pub event: EditAuditKind,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Variant name when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    /// Field key (`name` or `parent.child`) when the event concerns one field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Optional detail message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl EditAuditEvent {
    /// Creates an event with a consistent timestamp.
    #[must_use]
    pub fn new(event: EditAuditKind) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event,
            timestamp_ms,
            variant: None,
            field: None,
            message: None,
        }
    }

    /// Sets the variant name.
    #[must_use]
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    /// Sets the field key.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Sets the detail message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for edit events.
pub trait EditAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &EditAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl EditAuditSink for StderrAuditSink {
    fn record(&self, event: &EditAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl EditAuditSink for FileAuditSink {
    fn record(&self, event: &EditAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Audit sink that discards events.
pub struct NoopAuditSink;

impl EditAuditSink for NoopAuditSink {
    fn record(&self, _event: &EditAuditEvent) {}
}

/// Audit sink that keeps events in memory.
#[derive(Default)]
pub struct MemoryAuditSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<EditAuditEvent>>,
}

impl MemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<EditAuditEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    /// Returns the recorded event kinds in arrival order.
    #[must_use]
    pub fn kinds(&self) -> Vec<EditAuditKind> {
        self.events().into_iter().map(|event| event.event).collect()
    }
}

impl EditAuditSink for MemoryAuditSink {
    fn record(&self, event: &EditAuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
