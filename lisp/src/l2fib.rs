// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The flat L2 overlay forwarding table: (bridge domain, destination mac, source mac)
//! to forwarding action. The control plane owns the single [`L2FibWriter`] and every
//! forwarding thread looks up through its own [`L2FibReader`]. Changes are published
//! one at a time, so readers see either the table before a change or after it.

use crate::mac::Mac;
use ahash::RandomState;
use fib::dpo::{Dpo, DpoProto, LbBucket, LoadBalance};
use left_right::{Absorb, ReadGuard, ReadHandle, ReadHandleFactory, WriteHandle};
use std::collections::HashMap;
use tracing::debug;

pub const DEFAULT_L2FIB_CAPACITY: usize = 64 * 1024;

/// Key of the flat table, packed in three words:
/// `[bd_index << 48 | dst_mac, src_mac, 0]`
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct L2FibKey([u64; 3]);

const MAC_MASK: u64 = (1 << 48) - 1;

impl L2FibKey {
    #[must_use]
    pub fn new(bd_index: u16, src: &Mac, dst: &Mac) -> Self {
        Self([
            (u64::from(bd_index) << 48) | dst.to_u64(),
            src.to_u64(),
            0,
        ])
    }
    #[must_use]
    pub fn words(&self) -> &[u64; 3] {
        &self.0
    }
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn bd_index(&self) -> u16 {
        (self.0[0] >> 48) as u16
    }
    #[must_use]
    pub fn dst_mac(&self) -> Mac {
        unpack_mac(self.0[0] & MAC_MASK)
    }
    #[must_use]
    pub fn src_mac(&self) -> Mac {
        unpack_mac(self.0[1] & MAC_MASK)
    }
}

fn unpack_mac(word: u64) -> Mac {
    let bytes = word.to_be_bytes();
    Mac([bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7]])
}

#[derive(Clone, Debug)]
pub struct L2FibTable {
    entries: HashMap<L2FibKey, Dpo, RandomState>,
    miss: Dpo,
}

impl L2FibTable {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let miss = Dpo::load_balance(LoadBalance::new(
            DpoProto::Ethernet,
            vec![LbBucket {
                dpo: Dpo::control_plane(DpoProto::Ethernet),
                weight: 1,
            }],
        ));
        Self {
            entries: HashMap::with_capacity_and_hasher(capacity, RandomState::with_seed(0)),
            miss,
        }
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    #[must_use]
    pub fn get(&self, key: &L2FibKey) -> Option<&Dpo> {
        self.entries.get(key)
    }
    /// The action of packets that match no entry: punt to the control plane
    #[must_use]
    pub fn miss(&self) -> &Dpo {
        &self.miss
    }
    pub fn iter(&self) -> impl Iterator<Item = (&L2FibKey, &Dpo)> {
        self.entries.iter()
    }

    ////////////////////////////////////////////////////////////////////////////////
    /// Look up the action for a frame. If there is no entry for the source, the
    /// entry for any source is used. If neither exists, the miss action is returned.
    ////////////////////////////////////////////////////////////////////////////////
    #[must_use]
    pub fn lookup(&self, bd_index: u16, src: &Mac, dst: &Mac) -> &Dpo {
        self.entries
            .get(&L2FibKey::new(bd_index, src, dst))
            .or_else(|| self.entries.get(&L2FibKey::new(bd_index, &Mac::ZERO, dst)))
            .unwrap_or(&self.miss)
    }
}

enum L2FibChange {
    Add(L2FibKey, Dpo),
    Del(L2FibKey),
}

impl Absorb<L2FibChange> for L2FibTable {
    fn absorb_first(&mut self, change: &mut L2FibChange, _: &Self) {
        match change {
            L2FibChange::Add(key, dpo) => {
                self.entries.insert(*key, dpo.clone());
            }
            L2FibChange::Del(key) => {
                self.entries.remove(key);
            }
        }
    }
    fn drop_first(self: Box<Self>) {}
    fn sync_with(&mut self, first: &Self) {
        *self = first.clone();
    }
}

pub struct L2FibWriter(WriteHandle<L2FibTable, L2FibChange>);
impl L2FibWriter {
    #[must_use]
    pub fn new(capacity: usize) -> (L2FibWriter, L2FibReader) {
        let (w, r) = left_right::new_from_empty::<L2FibTable, L2FibChange>(
            L2FibTable::with_capacity(capacity),
        );
        (L2FibWriter(w), L2FibReader(r))
    }
    #[must_use]
    pub fn as_l2fib_reader(&self) -> L2FibReader {
        L2FibReader(self.0.clone())
    }
    pub fn enter(&self) -> Option<ReadGuard<'_, L2FibTable>> {
        self.0.enter()
    }
    #[must_use]
    pub fn get(&self, key: &L2FibKey) -> Option<Dpo> {
        self.enter().and_then(|t| t.get(key).cloned())
    }
    #[must_use]
    pub fn miss(&self) -> Dpo {
        self.enter()
            .map(|t| t.miss().clone())
            .unwrap_or_else(|| Dpo::control_plane(DpoProto::Ethernet))
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.enter().map_or(0, |t| t.len())
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set the action for a key and publish. Returns the action it replaced.
    pub fn add(&mut self, bd_index: u16, src: &Mac, dst: &Mac, dpo: Dpo) -> Option<Dpo> {
        let key = L2FibKey::new(bd_index, src, dst);
        let old = self.get(&key);
        debug!("Setting l2 entry bd:{bd_index} {src} -> {dst}");
        self.0.append(L2FibChange::Add(key, dpo));
        self.0.publish();
        old
    }

    /// Remove the entry for a key and publish. Removing an absent key is a no-op.
    pub fn del(&mut self, bd_index: u16, src: &Mac, dst: &Mac) -> Option<Dpo> {
        let key = L2FibKey::new(bd_index, src, dst);
        let old = self.get(&key)?;
        debug!("Removing l2 entry bd:{bd_index} {src} -> {dst}");
        self.0.append(L2FibChange::Del(key));
        self.0.publish();
        Some(old)
    }
}

#[derive(Clone, Debug)]
pub struct L2FibReader(ReadHandle<L2FibTable>);
impl L2FibReader {
    pub fn enter(&self) -> Option<ReadGuard<'_, L2FibTable>> {
        self.0.enter()
    }
    #[must_use]
    pub fn factory(&self) -> L2FibReaderFactory {
        L2FibReaderFactory(self.0.factory())
    }
    /// Look up the action for a frame. Returns None if the writer is gone.
    #[must_use]
    pub fn lookup(&self, bd_index: u16, src: &Mac, dst: &Mac) -> Option<Dpo> {
        self.enter().map(|t| t.lookup(bd_index, src, dst).clone())
    }
}

/// Produces [`L2FibReader`]s. Unlike readers, it can be shared among threads.
pub struct L2FibReaderFactory(ReadHandleFactory<L2FibTable>);
impl L2FibReaderFactory {
    #[must_use]
    pub fn handle(&self) -> L2FibReader {
        L2FibReader(self.0.handle())
    }
}
