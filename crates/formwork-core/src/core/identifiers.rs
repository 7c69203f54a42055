// crates/formwork-core/src/core/identifiers.rs
// ============================================================================
// Module: Formwork Identifiers
// Description: Opaque identifiers for descriptor catalogs.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Catalog identifiers name the descriptor catalogs a host can fetch
//! (for example `aggregators` or `group_by`). They are opaque and serialize
//! as strings; sources decide what an identifier maps to.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Identifier of a descriptor catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogId(String);

impl CatalogId {
    /// Creates a new catalog identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for CatalogId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CatalogId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
