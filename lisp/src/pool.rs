// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The pool of forwarding entries. Entries live in slots of a generational arena
//! and are indexed by key. Other objects refer to entries by [`FwdEntryIndex`]: an
//! index whose slot was freed (and possibly reused) no longer resolves.

use crate::entry::FwdEntry;
use crate::errors::FwdEntryError;
use crate::key::FwdEntryKey;
use ahash::RandomState;
use generational_arena::{Arena, Index};
use std::collections::HashMap;

pub type FwdEntryIndex = Index;

pub struct FwdEntryPool {
    entries: Arena<FwdEntry>,
    by_key: HashMap<FwdEntryKey, FwdEntryIndex, RandomState>,
}

impl Default for FwdEntryPool {
    fn default() -> Self {
        Self::new()
    }
}

impl FwdEntryPool {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arena::new(),
            by_key: HashMap::with_hasher(RandomState::with_seed(0)),
        }
    }

    #[must_use]
    pub fn find(&self, key: &FwdEntryKey) -> Option<FwdEntryIndex> {
        self.by_key.get(key).copied()
    }

    /// Add an entry. Entries are never replaced.
    ///
    /// # Errors
    ///
    /// Fails if an entry with the same key exists.
    pub fn insert(&mut self, entry: FwdEntry) -> Result<FwdEntryIndex, FwdEntryError> {
        if self.by_key.contains_key(&entry.key) {
            return Err(FwdEntryError::DuplicateKey(entry.key));
        }
        let key = entry.key;
        let index = self.entries.insert(entry);
        self.by_key.insert(key, index);
        Ok(index)
    }

    /// Remove an entry from the index and free its slot
    pub fn remove(&mut self, index: FwdEntryIndex) -> Option<FwdEntry> {
        let entry = self.entries.remove(index)?;
        self.by_key.remove(&entry.key);
        Some(entry)
    }

    #[must_use]
    pub fn get(&self, index: FwdEntryIndex) -> Option<&FwdEntry> {
        self.entries.get(index)
    }
    pub fn get_mut(&mut self, index: FwdEntryIndex) -> Option<&mut FwdEntry> {
        self.entries.get_mut(index)
    }

    /// Get the entry in a slot, whatever its generation
    #[must_use]
    pub fn get_by_slot(&self, slot: usize) -> Option<(FwdEntryIndex, &FwdEntry)> {
        self.entries
            .get_unknown_gen(slot)
            .map(|(entry, index)| (index, entry))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (FwdEntryIndex, &FwdEntry)> {
        self.entries.iter()
    }

    /// A walk over the entries that allows removing the current one
    #[must_use]
    pub fn cursor(&self) -> PoolCursor {
        PoolCursor { next_slot: 0 }
    }

    fn capacity(&self) -> usize {
        self.entries.capacity()
    }
}

/// Position of a walk over a [`FwdEntryPool`]. The cursor does not borrow the pool,
/// so the pool may be modified between steps.
pub struct PoolCursor {
    next_slot: usize,
}

impl PoolCursor {
    /// The next occupied slot, if any
    pub fn next(&mut self, pool: &FwdEntryPool) -> Option<FwdEntryIndex> {
        while self.next_slot < pool.capacity() {
            let slot = self.next_slot;
            self.next_slot += 1;
            if let Some((index, _)) = pool.get_by_slot(slot) {
                return Some(index);
            }
        }
        None
    }
}

/// Slot number of an index, as shown to users
#[must_use]
pub fn slot_of(index: FwdEntryIndex) -> usize {
    index.into_raw_parts().0
}
