// crates/formwork-config/src/lib.rs
// ============================================================================
// Module: Formwork Config Library
// Description: Canonical config model, validation, and example generation.
// Purpose: Single source of truth for formwork.toml semantics.
// Dependencies: formwork-core, serde, toml
// ============================================================================

//! ## Overview
//! `formwork-config` defines the configuration model for Formwork tooling:
//! rule evaluation policy and limits, time-range defaults, the audit sink,
//! and named catalog files. Validation is strict and fail-closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
