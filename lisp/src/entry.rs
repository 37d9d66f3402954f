// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Overlay forwarding entries and the requests that create them

use crate::key::{EndpointId, FwdEntryKey};
use crate::paths::Path;
use crate::tenant::Tenant;
use fib::adjacency::NextHop;
use fib::dpo::{Dpo, DpoProto};
use fib::pathlist::PathListChild;
use fib::table::FibTableRef;
use std::rc::Rc;

/// What to do with the traffic of an entry without locators
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum NegativeAction {
    NoAction,
    ForwardNative,
    SendMapRequest,
    Drop,
}

impl NegativeAction {
    /// The action installed for a negative entry, if any. Entries that defer to
    /// native routing install nothing.
    #[must_use]
    pub fn dpo(&self, proto: DpoProto) -> Option<Dpo> {
        match self {
            NegativeAction::NoAction | NegativeAction::ForwardNative => None,
            NegativeAction::SendMapRequest => Some(Dpo::control_plane(proto)),
            NegativeAction::Drop => Some(Dpo::drop(proto)),
        }
    }

    #[must_use]
    pub fn is_native(&self) -> bool {
        matches!(self, NegativeAction::NoAction | NegativeAction::ForwardNative)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FwdEntryKind {
    Normal,
    Negative(NegativeAction),
}

/// Forwarding state of an entry routed by prefix
#[derive(Debug)]
pub struct IpFwd {
    pub eid_table_id: u32,
    /// lock on the table of the destination prefix
    pub eid_fib: FibTableRef,
    /// lock on the table of source prefixes of the destination. None until
    /// installed.
    pub src_fib: Option<FibTableRef>,
}

/// Forwarding state of an entry of the flat L2 table
#[derive(Debug)]
pub struct L2Fwd {
    pub bd_id: u32,
    pub bd_index: u16,
    /// subscription to the path-list of the entry
    pub child: Option<PathListChild>,
    /// the action last written to the flat table
    pub dpo: Option<Dpo>,
}

#[derive(Debug)]
pub enum EntryFwd {
    Ip(IpFwd),
    L2(L2Fwd),
}

#[derive(Debug)]
pub struct FwdEntry {
    pub key: FwdEntryKey,
    pub kind: FwdEntryKind,
    pub tenant: Rc<Tenant>,
    pub paths: Vec<Path>,
    pub fwd: EntryFwd,
    pub installed: bool,
}

impl FwdEntry {
    #[must_use]
    pub fn is_negative(&self) -> bool {
        matches!(self.kind, FwdEntryKind::Negative(_))
    }
    #[must_use]
    pub fn is_l2(&self) -> bool {
        matches!(self.fwd, EntryFwd::L2(_))
    }
}

/// A locator pair of a request: the next-hop of a tunnel and how to use it
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LocatorPair {
    pub priority: u8,
    pub weight: u8,
    pub next_hop: NextHop,
}

/// A request to add or delete an entry. Deletions only consider the key fields.
#[derive(Debug, Clone, PartialEq)]
pub struct FwdEntryRequest {
    pub remote: EndpointId,
    pub local: EndpointId,
    pub vni: u32,
    pub negative_action: Option<NegativeAction>,
    /// table of the remote prefix (L3)
    pub table_id: u32,
    /// bridge domain (L2)
    pub bd_id: u32,
    pub locator_pairs: Vec<LocatorPair>,
}

impl FwdEntryRequest {
    #[must_use]
    pub fn new(remote: EndpointId, local: EndpointId, vni: u32) -> Self {
        Self {
            remote,
            local,
            vni,
            negative_action: None,
            table_id: 0,
            bd_id: 0,
            locator_pairs: vec![],
        }
    }
    #[must_use]
    pub fn with_table_id(mut self, table_id: u32) -> Self {
        self.table_id = table_id;
        self
    }
    #[must_use]
    pub fn with_bd_id(mut self, bd_id: u32) -> Self {
        self.bd_id = bd_id;
        self
    }
    #[must_use]
    pub fn with_negative_action(mut self, action: NegativeAction) -> Self {
        self.negative_action = Some(action);
        self
    }
    #[must_use]
    pub fn with_locator(mut self, priority: u8, weight: u8, next_hop: NextHop) -> Self {
        self.locator_pairs.push(LocatorPair {
            priority,
            weight,
            next_hop,
        });
        self
    }
    #[must_use]
    pub fn key(&self) -> FwdEntryKey {
        FwdEntryKey::new(self.remote, self.local, self.vni)
    }
    #[must_use]
    pub fn kind(&self) -> FwdEntryKind {
        match self.negative_action {
            Some(action) => FwdEntryKind::Negative(action),
            None => FwdEntryKind::Normal,
        }
    }
}
