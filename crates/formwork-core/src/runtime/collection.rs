// crates/formwork-core/src/runtime/collection.rs
// ============================================================================
// Module: Formwork Ordered Collections
// Description: Ordered item list with single ("accordion") selection.
// Purpose: Edit many schema-backed instances with stable selection.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`OrderedCollection`] owns an ordered list and at most one selected index.
//! Every operation that changes the list hands the new sequence to the
//! owner's [`ItemsListener`]; the collection never reaches into its owner.
//!
//! ## Invariants
//! - The selected index, when set, is always below `len()`.
//! - Rejected operations leave items and selection untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by collection operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CollectionError {
    /// Index beyond the end of the list.
    #[error("index {index} is out of range for {len} item(s)")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Current length.
        len: usize,
    },
}

// ============================================================================
// SECTION: Listeners
// ============================================================================

/// Receives the item sequence after each mutation.
pub trait ItemsListener<T> {
    /// Called with the full item sequence after it changed.
    fn items_changed(&mut self, items: &[T]);
}

impl<T, F> ItemsListener<T> for F
where
    F: FnMut(&[T]),
{
    fn items_changed(&mut self, items: &[T]) {
        self(items);
    }
}

/// Listener that ignores notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl<T> ItemsListener<T> for NoopListener {
    fn items_changed(&mut self, _items: &[T]) {}
}

// ============================================================================
// SECTION: Collection
// ============================================================================

/// Ordered items with optional single selection.
#[derive(Debug, Clone)]
pub struct OrderedCollection<T, L = NoopListener> {
    /// Items in display order.
    items: Vec<T>,
    /// Selected index, if any.
    selected: Option<usize>,
    /// Owner notification hook.
    listener: L,
}

impl<T> OrderedCollection<T> {
    /// Creates an empty collection without notifications.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_listener(NoopListener)
    }
}

impl<T> Default for OrderedCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, L: ItemsListener<T>> OrderedCollection<T, L> {
    /// Creates an empty collection reporting to `listener`.
    #[must_use]
    pub const fn with_listener(listener: L) -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            listener,
        }
    }

    /// Returns the items in order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Returns the selected index.
    #[must_use]
    pub const fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Returns the selected item.
    #[must_use]
    pub fn selected_item(&self) -> Option<&T> {
        self.selected.and_then(|index| self.items.get(index))
    }

    /// Returns the item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the listener.
    pub const fn listener(&self) -> &L {
        &self.listener
    }

    /// Replaces every item with a copy of `items` (empty when absent) and
    /// clears the selection.
    pub fn replace_all(&mut self, items: Option<&[T]>)
    where
        T: Clone,
    {
        self.items = items.map(<[T]>::to_vec).unwrap_or_default();
        self.selected = None;
        self.notify();
    }

    /// Clears the selection when `index` is selected, else selects it.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::IndexOutOfRange`] when selecting an index
    /// past the end.
    pub fn toggle_select(&mut self, index: usize) -> Result<(), CollectionError> {
        if self.selected == Some(index) {
            self.selected = None;
            return Ok(());
        }
        self.check_index(index)?;
        self.selected = Some(index);
        Ok(())
    }

    /// Appends a default item and selects it. Returns its index.
    pub fn add(&mut self, make_default: impl FnOnce() -> T) -> usize {
        self.items.push(make_default());
        let index = self.items.len() - 1;
        self.selected = Some(index);
        self.notify();
        index
    }

    /// Appends a deep copy of the item at `index` without selecting it.
    /// Returns the index of the copy.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::IndexOutOfRange`] for a bad index.
    pub fn duplicate(&mut self, index: usize) -> Result<usize, CollectionError>
    where
        T: Clone,
    {
        let copy = self.items.get(index).cloned().ok_or_else(|| self.out_of_range(index))?;
        self.items.push(copy);
        self.notify();
        Ok(self.items.len() - 1)
    }

    /// Removes and returns the item at `index`, keeping the selection on the
    /// same logical item.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::IndexOutOfRange`] for a bad index.
    pub fn delete(&mut self, index: usize) -> Result<T, CollectionError> {
        self.check_index(index)?;
        let removed = self.items.remove(index);
        self.selected = match self.selected {
            Some(selected) if selected == index => None,
            Some(selected) if index < selected => Some(selected - 1),
            other => other,
        };
        self.notify();
        Ok(removed)
    }

    /// Stores `item` at `index` and returns the previous item.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::IndexOutOfRange`] for a bad index.
    pub fn replace(&mut self, index: usize, item: T) -> Result<T, CollectionError> {
        let error = self.out_of_range(index);
        let slot = self.items.get_mut(index).ok_or(error)?;
        let previous = std::mem::replace(slot, item);
        self.notify();
        Ok(previous)
    }

    /// Moves the item at `from` to position `to`; the selection follows the
    /// item it pointed at.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::IndexOutOfRange`] when either index is bad.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<(), CollectionError> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(());
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        self.selected = self.selected.map(|selected| {
            if selected == from {
                to
            } else if from < selected && selected <= to {
                selected - 1
            } else if to <= selected && selected < from {
                selected + 1
            } else {
                selected
            }
        });
        self.notify();
        Ok(())
    }

    /// Sends the current items to the listener.
    fn notify(&mut self) {
        self.listener.items_changed(&self.items);
    }

    /// Rejects indexes past the end.
    fn check_index(&self, index: usize) -> Result<(), CollectionError> {
        if index < self.items.len() { Ok(()) } else { Err(self.out_of_range(index)) }
    }

    /// Builds the out-of-range error for `index`.
    fn out_of_range(&self, index: usize) -> CollectionError {
        CollectionError::IndexOutOfRange {
            index,
            len: self.items.len(),
        }
    }
}
