// crates/formwork-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for Formwork configuration. The output is deterministic
//! and must load without errors.

/// Returns a canonical example `formwork.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[validation]
rule_error_policy = "fail_open"
max_expression_bytes = 4096
max_expression_depth = 32

[time_range]
default_start_relative = "1h"
default_end_relative = "1m"

[audit]
sink = "file"
path = "formwork-audit.log"

[catalogs]
aggregators = "catalogs/aggregators.json"
group_by = "catalogs/group_by.json"
# processors = "catalogs/processors.json"
"#,
    )
}
