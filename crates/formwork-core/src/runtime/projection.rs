// crates/formwork-core/src/runtime/projection.rs
// ============================================================================
// Module: Formwork Schema Projection
// Description: Sparse instance to edit-ready views and back.
// Purpose: Expand an instance against its variant schema and collapse edits.
// Dependencies: crate::core, crate::runtime::validation
// ============================================================================

//! ## Overview
//! [`project`] expands an [`Instance`] into one [`ViewProperty`] per field of
//! its variant, in declaration order, with the children of an object field
//! listed consecutively in place of their parent. [`commit`] collapses views
//! back into a fresh instance: active views are written, inactive views are
//! removed.
//!
//! A missing catalog, an empty catalog, or an instance naming an unknown
//! variant all project to an empty list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::DescriptorCatalog;
use crate::core::Instance;
use crate::core::ProcessorDescriptor;
use crate::core::PropertyDescriptor;
use crate::core::PropertyType;
use crate::core::ViewProperty;
use crate::runtime::validation::default_value_for;

// ============================================================================
// SECTION: Projection
// ============================================================================

/// Projects an instance against the catalog variant its name selects.
#[must_use]
pub fn project(catalog: Option<&DescriptorCatalog>, instance: &Instance) -> Vec<ViewProperty> {
    catalog
        .and_then(|catalog| catalog.find(&instance.name))
        .map_or_else(Vec::new, |variant| project_variant(variant, instance))
}

/// Projects an instance against an explicit variant.
#[must_use]
pub fn project_variant(variant: &ProcessorDescriptor, instance: &Instance) -> Vec<ViewProperty> {
    let mut views = Vec::with_capacity(variant.properties.len());
    for property in &variant.properties {
        if property.property_type == PropertyType::Object {
            views.extend(
                property.properties.iter().map(|child| view_for(child, Some(&property.name), instance)),
            );
        } else {
            views.push(view_for(property, None, instance));
        }
    }
    views
}

/// Builds the view of one field.
fn view_for(descriptor: &PropertyDescriptor, parent: Option<&str>, instance: &Instance) -> ViewProperty {
    let stored = match parent {
        Some(parent) => instance.get(&format!("{parent}.{}", descriptor.name)),
        None => instance.get(&descriptor.name),
    };
    ViewProperty {
        descriptor: descriptor.clone(),
        parent_name: parent.map(str::to_string),
        active: stored.is_some() || !descriptor.optional,
        value: stored.cloned().unwrap_or_else(|| default_value_for(descriptor)),
        error: String::new(),
    }
}

// ============================================================================
// SECTION: Commit
// ============================================================================

/// Collapses views into a fresh instance named `name`.
#[must_use]
pub fn commit(name: &str, views: &[ViewProperty]) -> Instance {
    let mut instance = Instance::new(name);
    for view in views {
        let key = view.effective_key();
        if view.active {
            instance.set(&key, view.value.clone());
        } else {
            instance.unset(&key);
        }
    }
    instance
}

/// Moves an instance to another variant.
///
/// Values whose keys the new variant also declares carry over; keys of the
/// old variant are dropped. An unknown variant yields an empty instance.
#[must_use]
pub fn switch_variant(catalog: Option<&DescriptorCatalog>, instance: &Instance, new_name: &str) -> Instance {
    let mut renamed = instance.clone();
    new_name.clone_into(&mut renamed.name);
    commit(new_name, &project(catalog, &renamed))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
