// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Prefix-routed forwarding tables. Routes may be contributed by several sources;
//! the forwarding of a route is that of its best source. A source may attach opaque
//! data to a route. Tables are shared: the [`Rc`] handles returned by the
//! [`FibTables`] registry act as locks, and a table is destroyed when the last
//! handle is dropped.

use crate::dpo::{Dpo, FwdChainType};
use crate::errors::FibError;
use crate::pathlist::PathList;
use crate::prefix::{FibProtocol, IpAddr, Prefix};
use ahash::RandomState;
use bitflags::bitflags;
use ipnet::{Ipv4Net, Ipv6Net};
use prefix_trie::PrefixMap;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::{Rc, Weak};
use tracing::debug;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct FibIndex(pub u32);

/// The sources of routes, in order of preference
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum FibSource {
    Api,
    Lisp,
}

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
    pub struct FibEntryFlags: u32 {
        /// The source provides the forwarding as is
        const EXCLUSIVE = 0b0000_0001;
    }
}

/// Data a source attaches to its routes
#[derive(Debug, Clone)]
pub enum SourceData {
    SrcFib(FibTableRef),
}

#[derive(Debug)]
enum RouteForwarding {
    Special(Dpo),
    PathList(Rc<PathList>),
}

#[derive(Debug)]
struct RouteSource {
    flags: FibEntryFlags,
    forwarding: RouteForwarding,
    data: Option<SourceData>,
}

#[derive(Debug, Default)]
struct FibRoute {
    sources: BTreeMap<FibSource, RouteSource>,
}

impl FibRoute {
    fn best(&self) -> Option<(&FibSource, &RouteSource)> {
        self.sources.iter().next()
    }
    fn forwarding(&self, proto: FibProtocol) -> Option<Dpo> {
        self.best().map(|(_, src)| match &src.forwarding {
            RouteForwarding::Special(dpo) => dpo.clone(),
            RouteForwarding::PathList(pl) => {
                pl.contribute_forwarding(FwdChainType::from_protocol(proto))
            }
        })
    }
}

/// A route as shown to users of a table
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    pub prefix: Prefix,
    pub source: FibSource,
    pub flags: FibEntryFlags,
    pub forwarding: Dpo,
}

/// A prefix table. Tables are owned by the control-plane thread and are not
/// shared with forwarding threads.
pub struct FibTable {
    index: FibIndex,
    proto: FibProtocol,
    table_id: Option<u32>,
    description: String,
    v4: RefCell<PrefixMap<Ipv4Net, FibRoute>>,
    v6: RefCell<PrefixMap<Ipv6Net, FibRoute>>,
}

pub type FibTableRef = Rc<FibTable>;

impl std::fmt::Debug for FibTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FibTable")
            .field("index", &self.index)
            .field("proto", &self.proto)
            .field("table_id", &self.table_id)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl FibTable {
    fn new(index: FibIndex, proto: FibProtocol, table_id: Option<u32>, description: String) -> Self {
        Self {
            index,
            proto,
            table_id,
            description,
            v4: RefCell::new(PrefixMap::new()),
            v6: RefCell::new(PrefixMap::new()),
        }
    }
    #[must_use]
    pub fn index(&self) -> FibIndex {
        self.index
    }
    #[must_use]
    pub fn proto(&self) -> FibProtocol {
        self.proto
    }
    #[must_use]
    pub fn table_id(&self) -> Option<u32> {
        self.table_id
    }
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    fn check_proto(&self, prefix: &Prefix) -> Result<(), FibError> {
        if prefix.protocol() == self.proto {
            Ok(())
        } else {
            Err(FibError::ProtocolMismatch(self.proto, prefix.protocol()))
        }
    }

    fn with_route<R>(&self, prefix: &Prefix, f: impl FnOnce(&FibRoute) -> R) -> Option<R> {
        match prefix {
            Prefix::IPV4(p) => self.v4.borrow().get(p).map(f),
            Prefix::IPV6(p) => self.v6.borrow().get(p).map(f),
        }
    }
    fn take_route(&self, prefix: &Prefix) -> Option<FibRoute> {
        match prefix {
            Prefix::IPV4(p) => self.v4.borrow_mut().remove(p),
            Prefix::IPV6(p) => self.v6.borrow_mut().remove(p),
        }
    }
    fn put_route(&self, prefix: &Prefix, route: FibRoute) {
        if route.sources.is_empty() {
            return;
        }
        match prefix {
            Prefix::IPV4(p) => self.v4.borrow_mut().insert(*p, route),
            Prefix::IPV6(p) => self.v6.borrow_mut().insert(*p, route),
        };
    }
    fn add_source(
        &self,
        prefix: &Prefix,
        source: FibSource,
        flags: FibEntryFlags,
        forwarding: RouteForwarding,
    ) -> Result<(), FibError> {
        self.check_proto(prefix)?;
        let mut route = self.take_route(prefix).unwrap_or_default();
        let data = route.sources.remove(&source).and_then(|s| s.data);
        route.sources.insert(
            source,
            RouteSource {
                flags,
                forwarding,
                data,
            },
        );
        self.put_route(prefix, route);
        Ok(())
    }

    /// Tell if a route exists for exactly this prefix
    #[must_use]
    pub fn lookup_exact_match(&self, prefix: &Prefix) -> bool {
        self.with_route(prefix, |_| ()).is_some()
    }

    /// Tell if a route exists for exactly this prefix and `source` contributes it
    #[must_use]
    pub fn is_sourced(&self, prefix: &Prefix, source: FibSource) -> bool {
        self.with_route(prefix, |r| r.sources.contains_key(&source))
            .unwrap_or(false)
    }

    /// Install a route that forwards with a given dpo. Replaces what `source`
    /// contributed before, keeping its data.
    ///
    /// # Errors
    ///
    /// Fails if the prefix is not of the family of the table.
    pub fn entry_special_dpo_add(
        &self,
        prefix: &Prefix,
        source: FibSource,
        flags: FibEntryFlags,
        dpo: Dpo,
    ) -> Result<(), FibError> {
        self.add_source(prefix, source, flags, RouteForwarding::Special(dpo))
    }

    /// Install a route that forwards over a path-list, or replace the paths of
    /// the route `source` contributed.
    ///
    /// # Errors
    ///
    /// Fails if the prefix is not of the family of the table.
    pub fn entry_update(
        &self,
        prefix: &Prefix,
        source: FibSource,
        flags: FibEntryFlags,
        pathlist: Rc<PathList>,
    ) -> Result<(), FibError> {
        self.add_source(prefix, source, flags, RouteForwarding::PathList(pathlist))
    }

    /// Remove what `source` contributes to a route. The route goes away with
    /// its last source. Returns false if `source` did not contribute it.
    pub fn entry_delete(&self, prefix: &Prefix, source: FibSource) -> bool {
        let Some(mut route) = self.take_route(prefix) else {
            return false;
        };
        let removed = route.sources.remove(&source).is_some();
        self.put_route(prefix, route);
        removed
    }

    #[must_use]
    pub fn get_source_data(&self, prefix: &Prefix, source: FibSource) -> Option<SourceData> {
        self.with_route(prefix, |r| r.sources.get(&source).and_then(|s| s.data.clone()))
            .flatten()
    }

    /// Attach data to the route contributed by `source`
    ///
    /// # Errors
    ///
    /// Fails if `source` does not contribute a route for the prefix.
    pub fn set_source_data(
        &self,
        prefix: &Prefix,
        source: FibSource,
        data: SourceData,
    ) -> Result<(), FibError> {
        let Some(mut route) = self.take_route(prefix) else {
            return Err(FibError::NoSuchRoute(*prefix));
        };
        let result = match route.sources.get_mut(&source) {
            Some(src) => {
                src.data = Some(data);
                Ok(())
            }
            None => Err(FibError::NoSuchRoute(*prefix)),
        };
        self.put_route(prefix, route);
        result
    }

    /// The number of routes that `source` contributes to
    #[must_use]
    pub fn num_entries(&self, source: FibSource) -> usize {
        let count = |r: &FibRoute| r.sources.contains_key(&source);
        self.v4.borrow().iter().filter(|(_, r)| count(r)).count()
            + self.v6.borrow().iter().filter(|(_, r)| count(r)).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.v4.borrow().iter().count() + self.v6.borrow().iter().count()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The forwarding of the route for exactly this prefix
    #[must_use]
    pub fn forwarding(&self, prefix: &Prefix) -> Option<Dpo> {
        self.with_route(prefix, |r| r.forwarding(self.proto)).flatten()
    }

    /// Longest prefix match
    #[must_use]
    pub fn lookup(&self, address: &IpAddr) -> Option<(Prefix, Dpo)> {
        match address {
            IpAddr::V4(a) => {
                let v4 = self.v4.borrow();
                let (p, r) = v4.get_lpm(&Ipv4Net::from(*a))?;
                Some((Prefix::from(*p), r.forwarding(self.proto)?))
            }
            IpAddr::V6(a) => {
                let v6 = self.v6.borrow();
                let (p, r) = v6.get_lpm(&Ipv6Net::from(*a))?;
                Some((Prefix::from(*p), r.forwarding(self.proto)?))
            }
        }
    }

    /// The routes of the table, each with its best source
    #[must_use]
    pub fn routes(&self) -> Vec<RouteSummary> {
        let summary = |prefix: Prefix, route: &FibRoute| {
            let (source, src) = route.best()?;
            Some(RouteSummary {
                prefix,
                source: *source,
                flags: src.flags,
                forwarding: route.forwarding(self.proto)?,
            })
        };
        let mut out: Vec<RouteSummary> = self
            .v4
            .borrow()
            .iter()
            .filter_map(|(p, r)| summary(Prefix::from(*p), r))
            .collect();
        out.extend(
            self.v6
                .borrow()
                .iter()
                .filter_map(|(p, r)| summary(Prefix::from(*p), r)),
        );
        out
    }
}

/// The registry of tables
pub struct FibTables {
    by_index: HashMap<FibIndex, Weak<FibTable>, RandomState>,
    by_id: HashMap<(FibProtocol, u32), FibIndex, RandomState>,
    next_index: u32,
}

impl Default for FibTables {
    fn default() -> Self {
        Self::new()
    }
}

impl FibTables {
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_index: HashMap::with_hasher(RandomState::with_seed(0)),
            by_id: HashMap::with_hasher(RandomState::with_seed(0)),
            next_index: 0,
        }
    }

    fn alloc(&mut self, proto: FibProtocol, table_id: Option<u32>, description: String) -> FibTableRef {
        let index = FibIndex(self.next_index);
        self.next_index = self.next_index.wrapping_add(1);
        debug!("Created {proto} fib table {index} ({description})");
        let table = Rc::new(FibTable::new(index, proto, table_id, description));
        self.by_index.insert(index, Rc::downgrade(&table));
        table
    }

    /// Create an anonymous table. The table lives as long as the returned handle
    /// or any clone of it.
    #[must_use]
    pub fn create_and_lock(&mut self, proto: FibProtocol, description: &str) -> FibTableRef {
        self.alloc(proto, None, description.to_owned())
    }

    /// Get the table with a given id, creating it if needed
    #[must_use]
    pub fn find_or_create_and_lock(&mut self, proto: FibProtocol, table_id: u32) -> FibTableRef {
        if let Some(table) = self.find(proto, table_id) {
            return table;
        }
        let table = self.alloc(proto, Some(table_id), format!("table-id {table_id}"));
        self.by_id.insert((proto, table_id), table.index());
        table
    }

    #[must_use]
    pub fn find(&self, proto: FibProtocol, table_id: u32) -> Option<FibTableRef> {
        self.by_id
            .get(&(proto, table_id))
            .and_then(|index| self.get(*index))
    }

    #[must_use]
    pub fn get(&self, index: FibIndex) -> Option<FibTableRef> {
        self.by_index.get(&index).and_then(Weak::upgrade)
    }

    /// Number of tables alive
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_index.values().filter(|w| w.strong_count() > 0).count()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = FibTableRef> + '_ {
        self.by_index.values().filter_map(Weak::upgrade)
    }

    pub fn purge(&mut self) -> usize {
        let len = self.by_index.len();
        self.by_index.retain(|_, t| t.strong_count() > 0);
        let by_index = &self.by_index;
        self.by_id.retain(|_, index| by_index.contains_key(index));
        len - self.by_index.len()
    }
}
