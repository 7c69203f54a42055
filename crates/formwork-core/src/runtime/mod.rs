// crates/formwork-core/src/runtime/mod.rs
// ============================================================================
// Module: Formwork Runtime
// Description: Validation, projection, collections, time ranges, and sessions.
// Purpose: Implement the editing behavior over the core data model.
// Dependencies: crate::{core, interfaces, audit}, rule-expr
// ============================================================================

//! ## Overview
//! Runtime modules are synchronous and deterministic: every call is a
//! function of its explicit inputs plus the state object it mutates.
//! Catalogs are borrowed as immutable snapshots.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod catalog;
pub mod collection;
pub mod projection;
pub mod query_check;
pub mod session;
pub mod suggestions;
pub mod time_range;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::FileCatalogSource;
pub use catalog::InMemoryCatalogSource;
pub use catalog::MAX_CATALOG_FILE_BYTES;
pub use catalog::load_catalog_or_absent;
pub use catalog::read_catalog_file;
pub use collection::CollectionError;
pub use collection::ItemsListener;
pub use collection::NoopListener;
pub use collection::OrderedCollection;
pub use projection::commit;
pub use projection::project;
pub use projection::project_variant;
pub use projection::switch_variant;
pub use query_check::QueryValidator;
pub use session::EditSession;
pub use session::SessionError;
pub use suggestions::SuggestionCache;
pub use time_range::BoundMode;
pub use time_range::Endpoint;
pub use time_range::TimeRange;
pub use time_range::TimeRangeDefaults;
pub use time_range::TimeRangeError;
pub use validation::RuleErrorPolicy;
pub use validation::RuleFault;
pub use validation::ValidationError;
pub use validation::ValidationOptions;
pub use validation::ValidationReport;
pub use validation::coerce_input;
pub use validation::default_value_for;
pub use validation::is_double_text;
pub use validation::is_integer_text;
pub use validation::is_long_text;
pub use validation::is_of_type;
pub use validation::validate;
pub use validation::validate_with_report;
