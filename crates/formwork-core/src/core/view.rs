// crates/formwork-core/src/core/view.rs
// ============================================================================
// Module: Formwork View Properties
// Description: Edit-time projection of one property against one instance.
// Purpose: Carry the descriptor, resolved value, activity, and field error.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! View properties exist only while editing. Projection creates a fresh list
//! and commit consumes it; nothing keeps a view across a projection boundary.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::descriptor::PropertyDescriptor;

/// Edit-ready projection of one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewProperty {
    /// Descriptor fields, flattened on the wire.
    #[serde(flatten)]
    pub descriptor: PropertyDescriptor,
    /// Parent object name when projected from a nested child.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    /// Whether the field is present in the instance or required.
    pub active: bool,
    /// Current value, defaulted when absent from the instance.
    pub value: Value,
    /// Current validation message; empty when valid.
    #[serde(default)]
    pub error: String,
}

impl ViewProperty {
    /// Returns the instance key: `parent.child` for nested fields, else `name`.
    #[must_use]
    pub fn effective_key(&self) -> String {
        match &self.parent_name {
            Some(parent) => format!("{parent}.{}", self.descriptor.name),
            None => self.descriptor.name.clone(),
        }
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Returns true when the field carries a validation message.
    #[must_use]
    pub fn has_error(&self) -> bool {
        !self.error.is_empty()
    }
}
