// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! State objects to keep tunnel adjacencies. A tunnel adjacency is identified by
//! the underlay next-hop (egress interface and the local and remote locators) and
//! by the overlay it serves (table id and vni). Adjacencies are shared: every user
//! holds an [`Rc`] and the adjacency ceases to exist when the last one is dropped.

use crate::errors::FibError;
use ahash::RandomState;
use std::cell::Cell;
use std::collections::HashMap;
use std::net::IpAddr;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

/// Index of an interface
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct IfIndex(pub u32);

/// Stable identifier of an adjacency
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct AdjIndex(pub u32);

/// Underlay next-hop descriptor of a tunnel
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NextHop {
    pub ifindex: IfIndex,
    pub lcl_loc: IpAddr,
    pub rmt_loc: IpAddr,
}

impl NextHop {
    #[must_use]
    pub fn new(ifindex: IfIndex, lcl_loc: IpAddr, rmt_loc: IpAddr) -> Self {
        Self {
            ifindex,
            lcl_loc,
            rmt_loc,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AdjacencyKey {
    pub nexthop: NextHop,
    pub table_id: u32,
    pub vni: u32,
}

#[derive(Debug)]
/// A shared tunnel adjacency
pub struct Adjacency {
    index: AdjIndex,
    key: AdjacencyKey,
    up: Cell<bool>,
}

impl Adjacency {
    #[must_use]
    pub fn index(&self) -> AdjIndex {
        self.index
    }
    #[must_use]
    pub fn key(&self) -> &AdjacencyKey {
        &self.key
    }
    #[must_use]
    pub fn nexthop(&self) -> &NextHop {
        &self.key.nexthop
    }
    /// An adjacency can carry traffic only if its egress interface is up
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.up.get()
    }
}

/// The store of all the adjacencies and of the interfaces they use
pub struct AdjacencyTable {
    interfaces: HashMap<IfIndex, bool, RandomState>,
    by_key: HashMap<AdjacencyKey, Weak<Adjacency>, RandomState>,
    by_index: HashMap<AdjIndex, Weak<Adjacency>, RandomState>,
    next_index: u32,
}

impl Default for AdjacencyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl AdjacencyTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            interfaces: HashMap::with_hasher(RandomState::with_seed(0)),
            by_key: HashMap::with_hasher(RandomState::with_seed(0)),
            by_index: HashMap::with_hasher(RandomState::with_seed(0)),
            next_index: 0,
        }
    }

    /// Register an interface that tunnels may egress through
    ///
    /// # Errors
    ///
    /// Fails if an interface with the same index is known.
    pub fn add_interface(&mut self, ifindex: IfIndex, up: bool) -> Result<(), FibError> {
        if self.interfaces.contains_key(&ifindex) {
            return Err(FibError::InterfaceExists(ifindex));
        }
        debug!("Registered interface {ifindex} (up:{up})");
        self.interfaces.insert(ifindex, up);
        Ok(())
    }

    #[must_use]
    pub fn interface_state(&self, ifindex: IfIndex) -> Option<bool> {
        self.interfaces.get(&ifindex).copied()
    }

    ////////////////////////////////////////////////////////////////////////////////
    /// Get the adjacency for a next-hop in some overlay, creating it if needed.
    /// The returned [`Rc`] is the lock: the adjacency lives as long as one exists.
    ////////////////////////////////////////////////////////////////////////////////
    pub fn find_or_create_and_lock(
        &mut self,
        nexthop: &NextHop,
        table_id: u32,
        vni: u32,
    ) -> Result<Rc<Adjacency>, FibError> {
        let Some(up) = self.interface_state(nexthop.ifindex) else {
            warn!("Can't build adjacency over unknown interface {}", nexthop.ifindex);
            return Err(FibError::NoSuchInterface(nexthop.ifindex));
        };
        let key = AdjacencyKey {
            nexthop: *nexthop,
            table_id,
            vni,
        };
        if let Some(adj) = self.by_key.get(&key).and_then(Weak::upgrade) {
            return Ok(adj);
        }
        let index = AdjIndex(self.next_index);
        self.next_index = self.next_index.wrapping_add(1);
        let adj = Rc::new(Adjacency {
            index,
            key,
            up: Cell::new(up),
        });
        debug!("Created adjacency {index} to {} (vni:{vni})", nexthop.rmt_loc);
        self.by_key.insert(key, Rc::downgrade(&adj));
        self.by_index.insert(index, Rc::downgrade(&adj));
        Ok(adj)
    }

    /// Get an adjacency by index if it still exists. This does not lock it
    /// beyond the lifetime of the returned handle.
    #[must_use]
    pub fn get(&self, index: AdjIndex) -> Option<Rc<Adjacency>> {
        self.by_index.get(&index).and_then(Weak::upgrade)
    }

    /// Number of adjacencies alive
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_index.values().filter(|w| w.strong_count() > 0).count()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Rc<Adjacency>> + '_ {
        self.by_index.values().filter_map(Weak::upgrade)
    }

    /// Forget the entries of adjacencies that no longer exist.
    /// Returns the number of entries removed.
    pub fn purge(&mut self) -> usize {
        let len = self.by_index.len();
        self.by_key.retain(|_, adj| adj.strong_count() > 0);
        self.by_index.retain(|_, adj| adj.strong_count() > 0);
        len - self.by_index.len()
    }

    ////////////////////////////////////////////////////////////////////////////////
    /// Change the operational state of an interface. Returns the indices of the
    /// adjacencies whose usability changed as a result.
    ////////////////////////////////////////////////////////////////////////////////
    pub fn set_interface_state(
        &mut self,
        ifindex: IfIndex,
        up: bool,
    ) -> Result<Vec<AdjIndex>, FibError> {
        let Some(state) = self.interfaces.get_mut(&ifindex) else {
            return Err(FibError::NoSuchInterface(ifindex));
        };
        if *state == up {
            return Ok(vec![]);
        }
        *state = up;
        debug!("Interface {ifindex} is now {}", if up { "up" } else { "down" });
        let mut changed: Vec<AdjIndex> = self
            .iter()
            .filter(|adj| adj.nexthop().ifindex == ifindex && adj.is_usable() != up)
            .map(|adj| {
                adj.up.set(up);
                adj.index()
            })
            .collect();
        changed.sort();
        Ok(changed)
    }
}
