// crates/formwork-core/src/lib.rs
// ============================================================================
// Module: Formwork Core Library
// Description: Public API surface for the schema-driven form engine.
// Purpose: Expose the data model, interfaces, runtime, and audit sinks.
// Dependencies: crate::{core, interfaces, runtime, audit}
// ============================================================================

//! ## Overview
//! Formwork turns a server-supplied descriptor catalog into edit-ready
//! forms. A sparse [`Instance`] is projected into [`ViewProperty`] values,
//! edited and validated, and committed back. Around that sit the interval
//! normalizer, ordered instance collections, and the time-range state
//! machine used to assemble a [`TimeSeriesQuery`].
//!
//! Collaborators (catalog and suggestion sources) plug in through
//! [`interfaces`]; nothing here performs network I/O.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use audit::EditAuditEvent;
pub use audit::EditAuditKind;
pub use audit::EditAuditSink;
pub use audit::FileAuditSink;
pub use audit::MemoryAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use interfaces::CatalogSource;
pub use interfaces::SuggestionError;
pub use interfaces::SuggestionSource;
pub use runtime::*;
