// crates/formwork-core/src/runtime/time_range.rs
// ============================================================================
// Module: Formwork Time-Range State Machine
// Description: Mutually exclusive relative/absolute query bounds.
// Purpose: Derive validity and display modes, and correct inconsistent bounds.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`TimeRange`] holds four optional bounds. It is valid when it has a
//! start bound and no endpoint has both its relative and absolute bound set.
//! Display modes are re-derived only while the range is valid, so an
//! inconsistent edit keeps showing the last consistent modes.
//!
//! The wall clock is never read here; callers pass `now` to
//! [`TimeRange::set_mode`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::Interval;
use crate::core::IntervalUnit;
use crate::core::TimeSeriesQuery;
use crate::core::UnixMillis;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Errors raised by time-range transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimeRangeError {
    /// The start bound cannot be switched off.
    #[error("the start bound is required and cannot be cleared")]
    StartRequired,
}

/// Range endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    /// Start of the range.
    Start,
    /// End of the range.
    End,
}

/// Which bound of an endpoint is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundMode {
    /// Offset back from now.
    Relative,
    /// Fixed instant.
    Absolute,
    /// No bound; only legal for the end.
    None,
}

/// Relative bounds used when a bound is created from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRangeDefaults {
    /// Default relative start (`1h`).
    pub start_relative: Interval,
    /// Default relative end (`1m`).
    pub end_relative: Interval,
}

impl Default for TimeRangeDefaults {
    fn default() -> Self {
        Self {
            start_relative: Interval::new(1, IntervalUnit::Hours),
            end_relative: Interval::new(1, IntervalUnit::Minutes),
        }
    }
}

/// Query time range with derived validity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    /// Start offset back from now.
    start_relative: Option<Interval>,
    /// Fixed start instant.
    start_absolute: Option<UnixMillis>,
    /// End offset back from now.
    end_relative: Option<Interval>,
    /// Fixed end instant.
    end_absolute: Option<UnixMillis>,
    /// Derived validity.
    valid: bool,
    /// Start display mode.
    start_mode: BoundMode,
    /// End display mode.
    end_mode: BoundMode,
    /// Defaults for newly created bounds.
    defaults: TimeRangeDefaults,
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::new(TimeRangeDefaults::default())
    }
}

impl TimeRange {
    /// Creates an empty (invalid) range.
    #[must_use]
    pub const fn new(defaults: TimeRangeDefaults) -> Self {
        Self {
            start_relative: None,
            start_absolute: None,
            end_relative: None,
            end_absolute: None,
            valid: false,
            start_mode: BoundMode::Relative,
            end_mode: BoundMode::None,
            defaults,
        }
    }

    /// Reads the bounds of a query.
    #[must_use]
    pub fn from_query(query: &TimeSeriesQuery, defaults: TimeRangeDefaults) -> Self {
        let mut range = Self::new(defaults);
        range.start_relative = query.start_relative;
        range.start_absolute = query.start_absolute;
        range.end_relative = query.end_relative;
        range.end_absolute = query.end_absolute;
        range.recompute();
        range
    }

    /// Writes the bounds into a query.
    pub const fn apply_to(&self, query: &mut TimeSeriesQuery) {
        query.start_relative = self.start_relative;
        query.start_absolute = self.start_absolute;
        query.end_relative = self.end_relative;
        query.end_absolute = self.end_absolute;
    }

    /// Returns the relative start.
    #[must_use]
    pub const fn start_relative(&self) -> Option<Interval> {
        self.start_relative
    }

    /// Returns the absolute start.
    #[must_use]
    pub const fn start_absolute(&self) -> Option<UnixMillis> {
        self.start_absolute
    }

    /// Returns the relative end.
    #[must_use]
    pub const fn end_relative(&self) -> Option<Interval> {
        self.end_relative
    }

    /// Returns the absolute end.
    #[must_use]
    pub const fn end_absolute(&self) -> Option<UnixMillis> {
        self.end_absolute
    }

    /// Returns true when the bounds are consistent.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns the start display mode.
    #[must_use]
    pub const fn start_mode(&self) -> BoundMode {
        self.start_mode
    }

    /// Returns the end display mode.
    #[must_use]
    pub const fn end_mode(&self) -> BoundMode {
        self.end_mode
    }

    /// Returns the defaults for new bounds.
    #[must_use]
    pub const fn defaults(&self) -> TimeRangeDefaults {
        self.defaults
    }

    /// Sets the relative start.
    pub fn set_start_relative(&mut self, value: Option<Interval>) {
        self.start_relative = value;
        self.recompute();
    }

    /// Sets the absolute start.
    pub fn set_start_absolute(&mut self, value: Option<UnixMillis>) {
        self.start_absolute = value;
        self.recompute();
    }

    /// Sets the relative end.
    pub fn set_end_relative(&mut self, value: Option<Interval>) {
        self.end_relative = value;
        self.recompute();
    }

    /// Sets the absolute end.
    pub fn set_end_absolute(&mut self, value: Option<UnixMillis>) {
        self.end_absolute = value;
        self.recompute();
    }

    /// Corrects inconsistent bounds.
    ///
    /// - no start: the default relative start is used;
    /// - both starts: the absolute start is dropped;
    /// - both ends: the relative end is dropped.
    pub fn normalize(&mut self) {
        if self.start_relative.is_none() && self.start_absolute.is_none() {
            self.start_relative = Some(self.defaults.start_relative);
            self.start_mode = BoundMode::Relative;
        }
        if self.start_relative.is_some() && self.start_absolute.is_some() {
            self.start_absolute = None;
            self.start_mode = BoundMode::Relative;
        }
        if self.end_relative.is_some() && self.end_absolute.is_some() {
            self.end_relative = None;
            self.end_mode = BoundMode::Absolute;
        }
        self.recompute();
    }

    /// Switches an endpoint to `mode`, replacing its bounds with a fresh
    /// default of that mode.
    ///
    /// An absolute start defaults to `now` minus the default relative start;
    /// an absolute end defaults to `now`.
    ///
    /// # Errors
    ///
    /// Returns [`TimeRangeError::StartRequired`] for `(Start, None)`.
    pub fn set_mode(
        &mut self,
        endpoint: Endpoint,
        mode: BoundMode,
        now: UnixMillis,
    ) -> Result<(), TimeRangeError> {
        match (endpoint, mode) {
            (Endpoint::Start, BoundMode::None) => return Err(TimeRangeError::StartRequired),
            (Endpoint::Start, BoundMode::Relative) => {
                self.start_relative = Some(self.defaults.start_relative);
                self.start_absolute = None;
            }
            (Endpoint::Start, BoundMode::Absolute) => {
                let offset = self.defaults.start_relative.as_millis().unwrap_or(u64::MAX);
                self.start_absolute = Some(now.saturating_sub_millis(offset));
                self.start_relative = None;
            }
            (Endpoint::End, BoundMode::Relative) => {
                self.end_relative = Some(self.defaults.end_relative);
                self.end_absolute = None;
            }
            (Endpoint::End, BoundMode::Absolute) => {
                self.end_absolute = Some(now);
                self.end_relative = None;
            }
            (Endpoint::End, BoundMode::None) => {
                self.end_relative = None;
                self.end_absolute = None;
            }
        }
        match endpoint {
            Endpoint::Start => self.start_mode = mode,
            Endpoint::End => self.end_mode = mode,
        }
        self.recompute();
        Ok(())
    }

    /// Re-derives validity, and the display modes when valid.
    fn recompute(&mut self) {
        let has_start = self.start_relative.is_some() || self.start_absolute.is_some();
        let start_conflict = self.start_relative.is_some() && self.start_absolute.is_some();
        let end_conflict = self.end_relative.is_some() && self.end_absolute.is_some();
        self.valid = has_start && !start_conflict && !end_conflict;
        if !self.valid {
            return;
        }
        self.start_mode =
            if self.start_absolute.is_some() { BoundMode::Absolute } else { BoundMode::Relative };
        self.end_mode = if self.end_absolute.is_some() {
            BoundMode::Absolute
        } else if self.end_relative.is_some() {
            BoundMode::Relative
        } else {
            BoundMode::None
        };
    }
}
