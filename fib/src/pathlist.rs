// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Shared path-lists. A path-list is a set of weighted paths over adjacencies.
//! Identical sets of paths share one path-list. Objects that derive their forwarding
//! from a path-list register as its children so that they are walked when the
//! adjacencies it uses change state.

use crate::adjacency::{AdjIndex, Adjacency};
use crate::dpo::{Dpo, FwdChainType, LbBucket, LoadBalance};
use crate::errors::FibError;
use crate::graph::ChildNode;
use ahash::RandomState;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::{Rc, Weak};
use tracing::debug;

/// A path over a tunnel adjacency. Lower preference values are better.
#[derive(Debug, Clone)]
pub struct RoutePath {
    pub adjacency: Rc<Adjacency>,
    pub weight: u32,
    pub preference: u8,
}

impl RoutePath {
    #[must_use]
    pub fn new(adjacency: Rc<Adjacency>, weight: u32, preference: u8) -> Self {
        Self {
            adjacency,
            weight,
            preference,
        }
    }
    fn key(&self) -> PathKey {
        (self.preference, self.adjacency.index(), self.weight)
    }
}

type PathKey = (u8, AdjIndex, u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct PathListIndex(pub u32);

/// Identifies the registration of one child in a path-list
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct ChildToken(u32);

#[derive(Debug)]
pub struct PathList {
    index: PathListIndex,
    paths: Vec<RoutePath>,
    children: RefCell<BTreeMap<ChildToken, ChildNode>>,
    next_token: Cell<u32>,
}

impl PathList {
    #[must_use]
    pub fn index(&self) -> PathListIndex {
        self.index
    }
    #[must_use]
    pub fn paths(&self) -> &[RoutePath] {
        &self.paths
    }
    #[must_use]
    pub fn uses(&self, adjacency: AdjIndex) -> bool {
        self.paths.iter().any(|p| p.adjacency.index() == adjacency)
    }
    #[must_use]
    pub fn children(&self) -> Vec<ChildNode> {
        self.children.borrow().values().copied().collect()
    }
    #[must_use]
    pub fn num_children(&self) -> usize {
        self.children.borrow().len()
    }

    ////////////////////////////////////////////////////////////////////////////////
    /// Compute the forwarding for a chain type. Only the usable paths with the best
    /// preference contribute, each as a bucket weighted like the path. If no path is
    /// usable, packets are dropped.
    ////////////////////////////////////////////////////////////////////////////////
    #[must_use]
    pub fn contribute_forwarding(&self, chain: FwdChainType) -> Dpo {
        let proto = chain.proto();
        let usable = || self.paths.iter().filter(|p| p.adjacency.is_usable());
        let Some(best) = usable().map(|p| p.preference).min() else {
            return Dpo::drop(proto);
        };
        let buckets = usable()
            .filter(|p| p.preference == best)
            .map(|p| LbBucket {
                dpo: Dpo::adjacency(p.adjacency.index(), proto),
                weight: p.weight,
            })
            .collect();
        Dpo::load_balance(LoadBalance::new(proto, buckets))
    }

    /// Register a child. The returned guard keeps the path-list alive and
    /// unregisters the child when dropped.
    #[must_use]
    pub fn child_add(this: &Rc<PathList>, child: ChildNode) -> PathListChild {
        let token = ChildToken(this.next_token.get());
        this.next_token.set(token.0.wrapping_add(1));
        this.children.borrow_mut().insert(token, child);
        PathListChild {
            pathlist: Rc::clone(this),
            token,
        }
    }

    fn child_remove(&self, token: ChildToken) {
        self.children.borrow_mut().remove(&token);
    }
}

/// The registration of a child in a path-list
#[derive(Debug)]
pub struct PathListChild {
    pathlist: Rc<PathList>,
    token: ChildToken,
}

impl PathListChild {
    #[must_use]
    pub fn pathlist(&self) -> &Rc<PathList> {
        &self.pathlist
    }
    #[must_use]
    pub fn token(&self) -> ChildToken {
        self.token
    }
}

impl Drop for PathListChild {
    fn drop(&mut self) {
        self.pathlist.child_remove(self.token);
    }
}

/// The store of path-lists
pub struct PathListTable {
    by_paths: HashMap<Vec<PathKey>, Weak<PathList>, RandomState>,
    by_index: HashMap<PathListIndex, Weak<PathList>, RandomState>,
    next_index: u32,
}

impl Default for PathListTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PathListTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_paths: HashMap::with_hasher(RandomState::with_seed(0)),
            by_index: HashMap::with_hasher(RandomState::with_seed(0)),
            next_index: 0,
        }
    }

    ////////////////////////////////////////////////////////////////////////////////
    /// Get a path-list for a set of paths. If one exists for the same set, it is
    /// shared.
    ///
    /// # Errors
    ///
    /// Fails if `paths` is empty.
    ////////////////////////////////////////////////////////////////////////////////
    pub fn create(&mut self, mut paths: Vec<RoutePath>) -> Result<Rc<PathList>, FibError> {
        if paths.is_empty() {
            return Err(FibError::EmptyPathList);
        }
        paths.sort_by_key(RoutePath::key);
        let key: Vec<PathKey> = paths.iter().map(RoutePath::key).collect();
        if let Some(pl) = self.by_paths.get(&key).and_then(Weak::upgrade) {
            return Ok(pl);
        }
        let index = PathListIndex(self.next_index);
        self.next_index = self.next_index.wrapping_add(1);
        let pl = Rc::new(PathList {
            index,
            paths,
            children: RefCell::new(BTreeMap::new()),
            next_token: Cell::new(0),
        });
        debug!("Created path-list {} with {} paths", index.0, pl.paths.len());
        self.by_paths.insert(key, Rc::downgrade(&pl));
        self.by_index.insert(index, Rc::downgrade(&pl));
        Ok(pl)
    }

    #[must_use]
    pub fn get(&self, index: PathListIndex) -> Option<Rc<PathList>> {
        self.by_index.get(&index).and_then(Weak::upgrade)
    }

    /// Number of path-lists alive
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_index.values().filter(|w| w.strong_count() > 0).count()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The children of all path-lists that use an adjacency
    #[must_use]
    pub fn children_of(&self, adjacency: AdjIndex) -> Vec<ChildNode> {
        let mut pls: Vec<Rc<PathList>> = self
            .by_index
            .values()
            .filter_map(Weak::upgrade)
            .filter(|pl| pl.uses(adjacency))
            .collect();
        pls.sort_by_key(|pl| pl.index());
        pls.iter().flat_map(|pl| pl.children()).collect()
    }

    pub fn purge(&mut self) -> usize {
        let len = self.by_index.len();
        self.by_paths.retain(|_, pl| pl.strong_count() > 0);
        self.by_index.retain(|_, pl| pl.strong_count() > 0);
        len - self.by_index.len()
    }
}
