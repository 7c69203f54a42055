// crates/formwork-core/src/core/mod.rs
// ============================================================================
// Module: Formwork Core Types
// Description: Canonical descriptor, instance, view, interval, and query types.
// Purpose: Provide stable, serializable types shared by every runtime module.
// Dependencies: serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! Core types describe schemas (descriptors and catalogs), the sparse objects
//! users edit (instances), the edit-time projection of a field (views), and
//! the wire shapes those objects end up in (intervals and queries).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod descriptor;
pub mod identifiers;
pub mod instance;
pub mod interval;
pub mod query;
pub mod time;
pub mod view;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use descriptor::CatalogError;
pub use descriptor::DescriptorCatalog;
pub use descriptor::ProcessorDescriptor;
pub use descriptor::PropertyDescriptor;
pub use descriptor::PropertyType;
pub use descriptor::ValidationRule;
pub use identifiers::CatalogId;
pub use instance::Instance;
pub use interval::ACCEPTED_CODES;
pub use interval::Interval;
pub use interval::IntervalError;
pub use interval::IntervalUnit;
pub use interval::format_interval;
pub use interval::parse_interval;
pub use interval::to_long_form;
pub use query::MetricQuery;
pub use query::QueryError;
pub use query::QueryIssue;
pub use query::TimeSeriesQuery;
pub use time::TimeParseError;
pub use time::UnixMillis;
pub use view::ViewProperty;
