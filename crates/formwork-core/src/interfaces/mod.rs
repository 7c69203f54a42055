// crates/formwork-core/src/interfaces/mod.rs
// ============================================================================
// Module: Formwork Interfaces
// Description: Contracts for the catalog and suggestion collaborators.
// Purpose: Keep transport and storage details outside the form engine.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The form engine consumes two collaborators. A [`CatalogSource`] supplies
//! descriptor catalogs; any failure is treated as "catalog absent" by the
//! runtime. A [`SuggestionSource`] supplies advisory autocomplete values that
//! never affect validity.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::CatalogError;
use crate::core::CatalogId;
use crate::core::DescriptorCatalog;

// ============================================================================
// SECTION: Catalog Source
// ============================================================================

/// Supplier of descriptor catalogs.
pub trait CatalogSource {
    /// Fetches the catalog registered under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the catalog is missing, unreadable, or
    /// structurally invalid.
    ///
    /// # Invariants
    /// - A returned catalog has passed [`DescriptorCatalog::validate`].
    fn fetch_catalog(&self, id: &CatalogId) -> Result<DescriptorCatalog, CatalogError>;
}

// ============================================================================
// SECTION: Suggestion Source
// ============================================================================

/// Suggestion lookup errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SuggestionError {
    /// The suggestion source failed.
    #[error("suggestion source error: {0}")]
    Source(String),
}

/// Supplier of autocomplete suggestions.
pub trait SuggestionSource {
    /// Returns every suggestion for `entity` under the `hint` token (for
    /// example the tag names of a metric when the hint is `tags`).
    ///
    /// # Errors
    ///
    /// Returns [`SuggestionError`] when the lookup fails.
    fn suggest(&self, entity: &str, hint: &str) -> Result<Vec<String>, SuggestionError>;
}
