// crates/formwork-core/src/core/instance.rs
// ============================================================================
// Module: Formwork Instances
// Description: Sparse, persisted configuration objects edited through forms.
// Purpose: Store field values by top-level key or two-level dotted path.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! An [`Instance`] is the wire object a form edits: a variant `name` plus a
//! sparse set of fields. Nested object fields live under their parent key and
//! are addressed as `parent.child`. Absent optional keys mean "inactive".
//!
//! On the wire the fields sit beside `name` in one JSON object:
//! `{"name": "avg", "sampling": {"value": 1, "unit": "minutes"}}`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::descriptor::ProcessorDescriptor;

// ============================================================================
// SECTION: Instance
// ============================================================================

/// Sparse configuration object selecting a schema variant by name.
///
/// # Invariants
/// - Paths have at most two segments; deeper paths are never written.
/// - A parent object left empty by [`Instance::unset`] is removed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Instance {
    /// Variant name selecting the governing processor descriptor.
    pub name: String,
    /// Field values keyed by top-level name.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Instance {
    /// Creates an instance with an empty payload.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Map::new(),
        }
    }

    /// Returns the value at a top-level key or `parent.child` path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        match path.split_once('.') {
            Some((parent, child)) => self.fields.get(parent)?.as_object()?.get(child),
            None => self.fields.get(path),
        }
    }

    /// Returns true when the path is present.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Writes a value, creating the parent object when needed.
    ///
    /// A non-object value already stored under the parent key is replaced.
    pub fn set(&mut self, path: &str, value: Value) {
        match path.split_once('.') {
            Some((parent, child)) => {
                let slot = self
                    .fields
                    .entry(parent.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                if let Value::Object(children) = slot {
                    children.insert(child.to_string(), value);
                }
            }
            None => {
                self.fields.insert(path.to_string(), value);
            }
        }
    }

    /// Removes a value, and its parent object when that becomes empty.
    ///
    /// Returns the removed value.
    pub fn unset(&mut self, path: &str) -> Option<Value> {
        match path.split_once('.') {
            Some((parent, child)) => {
                let children = self.fields.get_mut(parent)?.as_object_mut()?;
                let removed = children.remove(child);
                if children.is_empty() {
                    self.fields.remove(parent);
                }
                removed
            }
            None => self.fields.remove(path),
        }
    }

    /// Returns every present leaf path in field order.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for (key, value) in &self.fields {
            match value {
                Value::Object(children) if !children.is_empty() => {
                    paths.extend(children.keys().map(|child| format!("{key}.{child}")));
                }
                _ => paths.push(key.clone()),
            }
        }
        paths
    }

    /// Returns present paths the variant does not declare.
    #[must_use]
    pub fn unknown_paths(&self, variant: &ProcessorDescriptor) -> Vec<String> {
        self.paths().into_iter().filter(|path| variant.property(path).is_none()).collect()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
