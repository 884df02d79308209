//! Lazily filled caches for derived network collections.
//!
//! A slot is filled on first read through a shared reference and emptied
//! through an exclusive one, so a mutation can never race a cached read.
//! Callers holding `&T` from a slot keep the same allocation until the next
//! invalidation.

use std::cell::OnceCell;

use crate::models::{EventId, OperationId};
use crate::path::Path;

/// Whether a cache slot currently holds a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Valid,
}

/// A single lazily computed value.
#[derive(Debug)]
pub struct CacheSlot<T> {
    value: OnceCell<T>,
}

impl<T> Default for CacheSlot<T> {
    fn default() -> Self {
        Self {
            value: OnceCell::new(),
        }
    }
}

impl<T> CacheSlot<T> {
    pub fn state(&self) -> CacheState {
        match self.value.get() {
            Some(_) => CacheState::Valid,
            None => CacheState::Empty,
        }
    }

    /// Return the cached value, computing it first if the slot is empty.
    pub fn get_or_fill(&self, fill: impl FnOnce() -> T) -> &T {
        self.value.get_or_init(fill)
    }

    pub fn invalidate(&mut self) {
        self.value.take();
    }
}

/// The four derived collections owned by the network model.
#[derive(Debug, Default)]
pub struct NetCache {
    pub full_paths: CacheSlot<Vec<Path>>,
    pub critical_paths: CacheSlot<Vec<Path>>,
    pub sorted_events: CacheSlot<Vec<EventId>>,
    pub sorted_operations: CacheSlot<Vec<OperationId>>,
}

impl NetCache {
    /// Empty every slot.
    pub fn invalidate_all(&mut self) {
        self.full_paths.invalidate();
        self.critical_paths.invalidate();
        self.sorted_events.invalidate();
        self.sorted_operations.invalidate();
    }

    /// Number of slots currently holding a value.
    pub fn valid_count(&self) -> usize {
        [
            self.full_paths.state(),
            self.critical_paths.state(),
            self.sorted_events.state(),
            self.sorted_operations.state(),
        ]
        .iter()
        .filter(|&&s| s == CacheState::Valid)
        .count()
    }
}
