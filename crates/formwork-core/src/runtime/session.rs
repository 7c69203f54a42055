// crates/formwork-core/src/runtime/session.rs
// ============================================================================
// Module: Formwork Edit Sessions
// Description: Edit state of one instance between projection and commit.
// Purpose: Coerce and validate field edits and store per-field messages.
// Dependencies: crate::core, crate::runtime, crate::audit, thiserror
// ============================================================================

//! ## Overview
//! An [`EditSession`] projects an instance once, takes field edits, keeps the
//! validation message of every active field in its view, and commits back to
//! a fresh instance. Validation stays pure; the session is the caller that
//! decides where messages live.
//!
//! Audit events: `schema_mismatch` when the variant is unknown,
//! `field_invalid` and `rule_fault_suppressed` while validating,
//! `variant_switched` and `instance_committed` on those transitions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::audit::EditAuditEvent;
use crate::audit::EditAuditKind;
use crate::audit::EditAuditSink;
use crate::core::DescriptorCatalog;
use crate::core::Instance;
use crate::core::ViewProperty;
use crate::runtime::projection;
use crate::runtime::validation::ValidationOptions;
use crate::runtime::validation::coerce_input;
use crate::runtime::validation::validate_with_report;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by session edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No field with this key exists in the current variant.
    #[error("unknown field `{key}`")]
    UnknownField {
        /// Requested field key.
        key: String,
    },
    /// Required fields cannot be deactivated.
    #[error("field `{key}` is required and cannot be deactivated")]
    RequiredField {
        /// Requested field key.
        key: String,
    },
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Edit state of one instance.
pub struct EditSession<'a> {
    /// Catalog snapshot; `None` when the catalog is unavailable.
    catalog: Option<&'a DescriptorCatalog>,
    /// Current variant name.
    name: String,
    /// Current views, one per field.
    views: Vec<ViewProperty>,
    /// Validation options applied to every edit.
    options: ValidationOptions,
    /// Audit sink for edit events.
    audit: &'a dyn EditAuditSink,
}

impl<'a> EditSession<'a> {
    /// Projects `instance` and validates its active fields.
    #[must_use]
    pub fn open(
        catalog: Option<&'a DescriptorCatalog>,
        instance: &Instance,
        options: ValidationOptions,
        audit: &'a dyn EditAuditSink,
    ) -> Self {
        let mut session = Self {
            catalog,
            name: instance.name.clone(),
            views: Vec::new(),
            options,
            audit,
        };
        session.load(instance);
        session
    }

    /// Returns the variant name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current views in projection order.
    #[must_use]
    pub fn views(&self) -> &[ViewProperty] {
        &self.views
    }

    /// Returns the view for a field key (`name` or `parent.child`).
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&ViewProperty> {
        self.views.iter().find(|view| view.effective_key() == key)
    }

    /// Coerces form text for a field, activates it, and validates it.
    ///
    /// Returns whether the new value is valid.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownField`] for an unknown key.
    pub fn set_text(&mut self, key: &str, text: &str) -> Result<bool, SessionError> {
        let index = self.index_of(key)?;
        let value = coerce_input(&self.views[index].descriptor, text);
        Ok(self.store(index, value))
    }

    /// Stores a typed value for a field, activates it, and validates it.
    ///
    /// Returns whether the new value is valid.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownField`] for an unknown key.
    pub fn set_value(&mut self, key: &str, value: Value) -> Result<bool, SessionError> {
        let index = self.index_of(key)?;
        Ok(self.store(index, value))
    }

    /// Activates or deactivates a field. Inactive fields carry no message.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownField`] for an unknown key and
    /// [`SessionError::RequiredField`] when deactivating a required field.
    pub fn set_active(&mut self, key: &str, active: bool) -> Result<(), SessionError> {
        let index = self.index_of(key)?;
        let view = &mut self.views[index];
        if !active && !view.descriptor.optional {
            return Err(SessionError::RequiredField {
                key: key.to_string(),
            });
        }
        view.active = active;
        if active {
            self.check(index);
        } else {
            view.error.clear();
        }
        Ok(())
    }

    /// Moves the instance to another variant, keeping values whose keys the
    /// new variant also declares.
    pub fn switch_variant(&mut self, new_name: &str) {
        let current = projection::commit(&self.name, &self.views);
        let switched = projection::switch_variant(self.catalog, &current, new_name);
        self.audit.record(
            &EditAuditEvent::new(EditAuditKind::VariantSwitched)
                .with_variant(new_name)
                .with_message(format!("from `{}`", self.name)),
        );
        self.name = new_name.to_string();
        self.load(&switched);
    }

    /// Returns `(key, message)` for every active field with a message.
    #[must_use]
    pub fn errors(&self) -> Vec<(String, String)> {
        self.views
            .iter()
            .filter(|view| view.active && view.has_error())
            .map(|view| (view.effective_key(), view.error.clone()))
            .collect()
    }

    /// Returns true when no active field carries a message.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.views.iter().any(|view| view.active && view.has_error())
    }

    /// Collapses the views into a fresh instance.
    #[must_use]
    pub fn commit(&self) -> Instance {
        let instance = projection::commit(&self.name, &self.views);
        self.audit.record(
            &EditAuditEvent::new(EditAuditKind::InstanceCommitted)
                .with_variant(&self.name)
                .with_message(format!("{} field(s)", instance.paths().len())),
        );
        instance
    }

    /// Projects an instance into fresh views and validates active fields.
    fn load(&mut self, instance: &Instance) {
        if self.catalog.is_some_and(|catalog| catalog.find(&instance.name).is_none()) {
            self.audit.record(
                &EditAuditEvent::new(EditAuditKind::SchemaMismatch)
                    .with_variant(&instance.name)
                    .with_message("variant not found in catalog"),
            );
        }
        self.views = projection::project(self.catalog, instance);
        for index in 0 .. self.views.len() {
            if self.views[index].active {
                self.check(index);
            }
        }
    }

    /// Stores a value, activates the field, and validates it.
    fn store(&mut self, index: usize, value: Value) -> bool {
        let view = &mut self.views[index];
        view.value = value;
        view.active = true;
        self.check(index)
    }

    /// Validates one view and stores its message. Returns validity.
    fn check(&mut self, index: usize) -> bool {
        let Some(view) = self.views.get(index) else {
            return false;
        };
        let key = view.effective_key();
        let message = match validate_with_report(&view.descriptor, &view.value, &self.options) {
            Ok(report) => {
                for fault in report.suppressed {
                    self.audit.record(
                        &EditAuditEvent::new(EditAuditKind::RuleFaultSuppressed)
                            .with_variant(&self.name)
                            .with_field(&key)
                            .with_message(format!("`{}`: {}", fault.expression, fault.error)),
                    );
                }
                String::new()
            }
            Err(err) => {
                let message = err.to_string();
                self.audit.record(
                    &EditAuditEvent::new(EditAuditKind::FieldInvalid)
                        .with_variant(&self.name)
                        .with_field(&key)
                        .with_message(&message),
                );
                message
            }
        };
        let valid = message.is_empty();
        if let Some(view) = self.views.get_mut(index) {
            view.error = message;
        }
        valid
    }

    /// Finds the view index for a key.
    fn index_of(&self, key: &str) -> Result<usize, SessionError> {
        self.views.iter().position(|view| view.effective_key() == key).ok_or_else(|| {
            SessionError::UnknownField {
                key: key.to_string(),
            }
        })
    }
}
