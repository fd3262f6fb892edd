//! Item pool.

use std::collections::HashMap;

use super::{CellRef, ScheduleItem};
use crate::error::{ExamError, Result};

/// Ordered, append-only collection of schedule items.
///
/// Items keep their insertion order; membership is tested by identity key.
/// Iteration borrows a view of the current members and has no cursor of
/// its own, so it can be restarted any number of times.
#[derive(Debug, Clone, Default)]
pub struct ItemPool {
    items: Vec<ScheduleItem>,
    index: HashMap<CellRef, usize>,
}

impl ItemPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item.
    ///
    /// # Errors
    /// [`ExamError::DuplicateItem`] if an item with the same key is present.
    pub fn push(&mut self, item: ScheduleItem) -> Result<()> {
        if self.index.contains_key(item.key()) {
            return Err(ExamError::DuplicateItem(item.key().clone()));
        }
        self.index.insert(item.key().clone(), self.items.len());
        self.items.push(item);
        Ok(())
    }

    /// Appends every item, stopping at the first duplicate.
    pub fn extend(&mut self, items: impl IntoIterator<Item = ScheduleItem>) -> Result<()> {
        for item in items {
            self.push(item)?;
        }
        Ok(())
    }

    /// Whether an item with this key is present.
    pub fn contains(&self, key: &CellRef) -> bool {
        self.index.contains_key(key)
    }

    /// Looks up an item by key.
    pub fn get(&self, key: &CellRef) -> Option<&ScheduleItem> {
        self.index.get(key).map(|&i| &self.items[i])
    }

    /// Position of an item in insertion order.
    pub fn position(&self, key: &CellRef) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Current members in insertion order.
    pub fn items(&self) -> &[ScheduleItem] {
        &self.items
    }

    /// Iterates over the current members.
    pub fn iter(&self) -> std::slice::Iter<'_, ScheduleItem> {
        self.items.iter()
    }

    /// Mutable access for recording solved values.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ScheduleItem> {
        self.items.iter_mut()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a ItemPool {
    type Item = &'a ScheduleItem;
    type IntoIter = std::slice::Iter<'a, ScheduleItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
