// crates/formwork-core/src/runtime/query_check.rs
// ============================================================================
// Module: Formwork Query Checks
// Description: Pre-submission checks for time-series queries.
// Purpose: Report every problem in a query with a precise location.
// Dependencies: crate::core, crate::runtime
// ============================================================================

//! ## Overview
//! [`QueryValidator`] walks a [`TimeSeriesQuery`] and collects
//! [`QueryIssue`]s rather than stopping at the first one. Aggregator and
//! group-by instances are projected against their catalogs and every active
//! field is validated; without a catalog those instances are not checked.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::DescriptorCatalog;
use crate::core::Instance;
use crate::core::QueryError;
use crate::core::QueryIssue;
use crate::core::TimeSeriesQuery;
use crate::runtime::projection::project_variant;
use crate::runtime::time_range::TimeRange;
use crate::runtime::time_range::TimeRangeDefaults;
use crate::runtime::validation::ValidationOptions;
use crate::runtime::validation::validate;

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Checks queries against optional aggregator and group-by catalogs.
#[derive(Debug, Clone, Default)]
pub struct QueryValidator<'a> {
    /// Catalog governing aggregator instances.
    aggregators: Option<&'a DescriptorCatalog>,
    /// Catalog governing group-by instances.
    group_by: Option<&'a DescriptorCatalog>,
    /// Validation options for instance fields.
    options: ValidationOptions,
}

impl<'a> QueryValidator<'a> {
    /// Creates a validator without catalogs.
    #[must_use]
    pub fn new(options: ValidationOptions) -> Self {
        Self {
            aggregators: None,
            group_by: None,
            options,
        }
    }

    /// Checks aggregator instances against `catalog`.
    #[must_use]
    pub const fn with_aggregators(mut self, catalog: &'a DescriptorCatalog) -> Self {
        self.aggregators = Some(catalog);
        self
    }

    /// Checks group-by instances against `catalog`.
    #[must_use]
    pub const fn with_group_by(mut self, catalog: &'a DescriptorCatalog) -> Self {
        self.group_by = Some(catalog);
        self
    }

    /// Returns every issue found, in query order.
    #[must_use]
    pub fn check(&self, query: &TimeSeriesQuery) -> Vec<QueryIssue> {
        let mut issues = Vec::new();
        check_time_range(query, &mut issues);
        if query.metrics.is_empty() {
            issues.push(QueryIssue::new("metrics", "at least one metric is required"));
        }
        for (index, metric) in query.metrics.iter().enumerate() {
            let base = format!("metrics[{index}]");
            if metric.name.trim().is_empty() {
                issues.push(QueryIssue::new(format!("{base}.name"), "metric name must be non-empty"));
            }
            if metric.limit == Some(0) {
                issues.push(QueryIssue::new(format!("{base}.limit"), "limit must be positive"));
            }
            if let Some(catalog) = self.aggregators {
                self.check_instances(catalog, &format!("{base}.aggregators"), &metric.aggregators, &mut issues);
            }
            if let Some(catalog) = self.group_by {
                self.check_instances(catalog, &format!("{base}.group_by"), &metric.group_by, &mut issues);
            }
        }
        issues
    }

    /// Fails with every issue when the query has any.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Invalid`] when [`QueryValidator::check`] reports
    /// issues.
    pub fn ensure_valid(&self, query: &TimeSeriesQuery) -> Result<(), QueryError> {
        let issues = self.check(query);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(QueryError::Invalid {
                issues,
            })
        }
    }

    /// Projects and validates each instance of one list.
    fn check_instances(
        &self,
        catalog: &DescriptorCatalog,
        base: &str,
        instances: &[Instance],
        issues: &mut Vec<QueryIssue>,
    ) {
        for (index, instance) in instances.iter().enumerate() {
            let path = format!("{base}[{index}]");
            let Some(variant) = catalog.find(&instance.name) else {
                issues.push(QueryIssue::new(
                    format!("{path}.name"),
                    format!("unknown variant `{}`", instance.name),
                ));
                continue;
            };
            for key in instance.unknown_paths(variant) {
                issues.push(QueryIssue::new(
                    format!("{path}.{key}"),
                    format!("field is not declared by `{}`", variant.name),
                ));
            }
            for view in project_variant(variant, instance).iter().filter(|view| view.active) {
                if let Err(err) = validate(&view.descriptor, &view.value, &self.options) {
                    issues.push(QueryIssue::new(format!("{path}.{}", view.effective_key()), err.to_string()));
                }
            }
        }
    }
}

/// Reports inconsistent or inverted time bounds.
fn check_time_range(query: &TimeSeriesQuery, issues: &mut Vec<QueryIssue>) {
    let range = TimeRange::from_query(query, TimeRangeDefaults::default());
    if range.is_valid() {
        let absolute_inverted =
            matches!((range.start_absolute(), range.end_absolute()), (Some(start), Some(end)) if end < start);
        let relative_inverted = matches!(
            (
                range.start_relative().and_then(|start| start.as_millis()),
                range.end_relative().and_then(|end| end.as_millis()),
            ),
            (Some(start), Some(end)) if end > start
        );
        if absolute_inverted || relative_inverted {
            issues.push(QueryIssue::new("end", "end bound is before the start bound"));
        }
        return;
    }
    let has_start = range.start_relative().is_some() || range.start_absolute().is_some();
    if !has_start {
        issues.push(QueryIssue::new("start", "a start bound is required"));
    }
    if range.start_relative().is_some() && range.start_absolute().is_some() {
        issues.push(QueryIssue::new(
            "start",
            "start_relative and start_absolute are mutually exclusive",
        ));
    }
    if range.end_relative().is_some() && range.end_absolute().is_some() {
        issues.push(QueryIssue::new("end", "end_relative and end_absolute are mutually exclusive"));
    }
}
