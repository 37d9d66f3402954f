// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Bridge domains: the user-visible id of a bridge domain and the compact index
//! used in flat table keys.

use crate::errors::FwdEntryError;
use ahash::RandomState;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

pub struct BridgeDomains {
    by_id: HashMap<u32, u16, RandomState>,
    free: BTreeSet<u16>,
    next_index: u16,
}

impl Default for BridgeDomains {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeDomains {
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_id: HashMap::with_hasher(RandomState::with_seed(0)),
            free: BTreeSet::new(),
            next_index: 0,
        }
    }

    /// Register a bridge domain. Registering a known one returns its index.
    ///
    /// # Errors
    ///
    /// Fails if all the indices are in use.
    pub fn add(&mut self, bd_id: u32) -> Result<u16, FwdEntryError> {
        if let Some(index) = self.by_id.get(&bd_id) {
            return Ok(*index);
        }
        let index = match self.free.pop_first() {
            Some(index) => index,
            None => {
                let index = self.next_index;
                self.next_index = self
                    .next_index
                    .checked_add(1)
                    .ok_or(FwdEntryError::InvalidOperation("too many bridge domains"))?;
                index
            }
        };
        debug!("Registered bridge domain {bd_id} with index {index}");
        self.by_id.insert(bd_id, index);
        Ok(index)
    }

    /// Unregister a bridge domain. Returns its index if it was known.
    pub fn del(&mut self, bd_id: u32) -> Option<u16> {
        let index = self.by_id.remove(&bd_id)?;
        self.free.insert(index);
        Some(index)
    }

    /// Find the index of a bridge domain
    ///
    /// # Errors
    ///
    /// Fails if the bridge domain is not registered.
    pub fn find_index(&self, bd_id: u32) -> Result<u16, FwdEntryError> {
        self.by_id
            .get(&bd_id)
            .copied()
            .ok_or(FwdEntryError::NoSuchBridgeDomain(bd_id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_domains() {
        let mut bds = BridgeDomains::new();
        assert_eq!(bds.add(10), Ok(0));
        assert_eq!(bds.add(20), Ok(1));
        assert_eq!(bds.add(10), Ok(0));
        assert_eq!(bds.find_index(20), Ok(1));
        assert_eq!(bds.find_index(30), Err(FwdEntryError::NoSuchBridgeDomain(30)));

        assert_eq!(bds.del(10), Some(0));
        assert_eq!(bds.del(10), None);
        assert_eq!(bds.add(30), Ok(0), "indices are reused");
        assert_eq!(bds.len(), 2);
    }
}
