// crates/formwork-core/src/core/query.rs
// ============================================================================
// Module: Formwork Query Model
// Description: Time-series query wire object assembled by the form engine.
// Purpose: Give committed instances and time ranges a concrete destination.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`TimeSeriesQuery`] is what the persistence/query-execution collaborator
//! accepts. Relative bounds use `{value, unit}` with long unit names; absolute
//! bounds are Unix milliseconds. Aggregators and group-bys are schema-backed
//! [`Instance`] values edited through the projection engine.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::instance::Instance;
use crate::core::interval::Interval;
use crate::core::time::UnixMillis;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Problem found in a query before submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryIssue {
    /// Location inside the query, for example `metrics[0].aggregators[1].sampling.value`.
    pub path: String,
    /// Human-readable description.
    pub message: String,
}

impl QueryIssue {
    /// Creates an issue.
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while decoding or checking a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Payload was not a valid query object.
    #[error("query decode error: {0}")]
    Decode(String),
    /// Query failed one or more checks.
    #[error("query has {} issue(s); first: {}", .issues.len(), first_issue(.issues))]
    Invalid {
        /// Every issue found, in query order.
        issues: Vec<QueryIssue>,
    },
}

/// Renders the first issue for error display.
fn first_issue(issues: &[QueryIssue]) -> String {
    issues.first().map_or_else(String::new, |issue| format!("{}: {}", issue.path, issue.message))
}

// ============================================================================
// SECTION: Query Types
// ============================================================================

/// One metric inside a query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetricQuery {
    /// Metric name.
    pub name: String,
    /// Tag filters: tag name to accepted values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, Vec<String>>,
    /// Group-by instances, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<Instance>,
    /// Aggregator pipeline instances, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aggregators: Vec<Instance>,
    /// Maximum data points returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl MetricQuery {
    /// Creates a metric query with no filters.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Time-series query submitted to the query service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeSeriesQuery {
    /// Start bound relative to now.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_relative: Option<Interval>,
    /// Absolute start bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_absolute: Option<UnixMillis>,
    /// End bound relative to now.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_relative: Option<Interval>,
    /// Absolute end bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_absolute: Option<UnixMillis>,
    /// Metrics to fetch.
    #[serde(default)]
    pub metrics: Vec<MetricQuery>,
    /// Server-side cache lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_time: Option<u64>,
    /// IANA time zone name for calendar-aligned aggregation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl TimeSeriesQuery {
    /// Decodes a query from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Decode`] when the payload is malformed.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, QueryError> {
        serde_json::from_slice(bytes).map_err(|err| QueryError::Decode(err.to_string()))
    }
}
