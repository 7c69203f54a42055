// crates/formwork-core/src/runtime/suggestions.rs
// ============================================================================
// Module: Formwork Suggestion Cache
// Description: Caller-owned cache of autocomplete suggestions.
// Purpose: Avoid repeated suggestion lookups with explicit invalidation.
// Dependencies: crate::interfaces, crate::audit
// ============================================================================

//! ## Overview
//! Suggestions are fetched once per `(entity, hint)` pair and filtered
//! locally by the partial text the user typed. The cache belongs to whoever
//! performs lookups; there is no process-wide state. Failed lookups are not
//! cached and yield an empty list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::audit::EditAuditEvent;
use crate::audit::EditAuditKind;
use crate::audit::EditAuditSink;
use crate::interfaces::SuggestionSource;

// ============================================================================
// SECTION: Cache
// ============================================================================

/// Suggestion lists keyed by `(entity, hint)`.
#[derive(Debug, Clone, Default)]
pub struct SuggestionCache {
    /// Cached suggestion lists.
    entries: BTreeMap<(String, String), Vec<String>>,
}

impl SuggestionCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns cached suggestions containing `partial` (ignoring case),
    /// fetching from `source` on a miss.
    pub fn suggest(
        &mut self,
        source: &dyn SuggestionSource,
        entity: &str,
        hint: &str,
        partial: &str,
        audit: &dyn EditAuditSink,
    ) -> Vec<String> {
        let key = (entity.to_string(), hint.to_string());
        if !self.entries.contains_key(&key) {
            match source.suggest(entity, hint) {
                Ok(values) => {
                    self.entries.insert(key.clone(), values);
                }
                Err(err) => {
                    audit.record(
                        &EditAuditEvent::new(EditAuditKind::SuggestionsFailed)
                            .with_variant(entity)
                            .with_field(hint)
                            .with_message(err.to_string()),
                    );
                    return Vec::new();
                }
            }
        }
        let needle = partial.trim().to_lowercase();
        self.entries.get(&key).map_or_else(Vec::new, |values| {
            values.iter().filter(|value| value.to_lowercase().contains(&needle)).cloned().collect()
        })
    }

    /// Drops cached lists for one entity, or every list when `entity` is
    /// `None`. Returns the number of lists removed.
    pub fn invalidate(&mut self, entity: Option<&str>) -> usize {
        let before = self.entries.len();
        match entity {
            Some(entity) => self.entries.retain(|(cached, _), _| cached != entity),
            None => self.entries.clear(),
        }
        before - self.entries.len()
    }

    /// Returns true when a list is cached for the pair.
    #[must_use]
    pub fn contains(&self, entity: &str, hint: &str) -> bool {
        self.entries.contains_key(&(entity.to_string(), hint.to_string()))
    }

    /// Returns the number of cached lists.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
