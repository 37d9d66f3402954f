// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Data-path objects: the forwarding actions that prefix routes and flat
//! table entries resolve to. Dpos are immutable values. Copying one is a clone and
//! resetting one is a drop. Load-balance groups are shared through an [`Arc`] so that
//! dpos can be handed to forwarding threads.

use crate::adjacency::AdjIndex;
use crate::prefix::FibProtocol;
use crate::table::FibIndex;
use std::sync::Arc;

/// The payload protocol a dpo forwards
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DpoProto {
    Ip4,
    Ip6,
    Ethernet,
}

impl From<FibProtocol> for DpoProto {
    fn from(value: FibProtocol) -> Self {
        match value {
            FibProtocol::Ip4 => DpoProto::Ip4,
            FibProtocol::Ip6 => DpoProto::Ip6,
        }
    }
}

/// The kind of forwarding a path-list is asked to contribute
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FwdChainType {
    UnicastIp4,
    UnicastIp6,
    Ethernet,
}

impl FwdChainType {
    #[must_use]
    pub fn from_protocol(proto: FibProtocol) -> Self {
        match proto {
            FibProtocol::Ip4 => FwdChainType::UnicastIp4,
            FibProtocol::Ip6 => FwdChainType::UnicastIp6,
        }
    }
    #[must_use]
    pub fn proto(&self) -> DpoProto {
        match self {
            FwdChainType::UnicastIp4 => DpoProto::Ip4,
            FwdChainType::UnicastIp6 => DpoProto::Ip6,
            FwdChainType::Ethernet => DpoProto::Ethernet,
        }
    }
}

/// Which address of a packet a lookup dpo uses as key
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LookupInput {
    SrcAddr,
    DstAddr,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LbBucket {
    pub dpo: Dpo,
    pub weight: u32,
}

/// A group of weighted dpos. A packet is sent to exactly one of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadBalance {
    pub proto: DpoProto,
    pub buckets: Vec<LbBucket>,
}

impl LoadBalance {
    #[must_use]
    pub fn new(proto: DpoProto, buckets: Vec<LbBucket>) -> Self {
        Self { proto, buckets }
    }
    #[must_use]
    pub fn total_weight(&self) -> u64 {
        self.buckets.iter().map(|b| u64::from(b.weight)).sum()
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Pick a bucket for a flow hash. Buckets are selected in proportion
    /// to their weight.
    #[must_use]
    pub fn select(&self, hash: u64) -> Option<&Dpo> {
        let total = self.total_weight();
        if total == 0 {
            return self.buckets.first().map(|b| &b.dpo);
        }
        let mut point = hash % total;
        for bucket in &self.buckets {
            let weight = u64::from(bucket.weight);
            if point < weight {
                return Some(&bucket.dpo);
            }
            point -= weight;
        }
        None
    }
}

/// A forwarding action
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Dpo {
    /// Discard the packet
    Drop(DpoProto),
    /// Punt to the control plane (send a map-request)
    ControlPlane(DpoProto),
    /// Look the packet up again in another table
    Lookup {
        table: FibIndex,
        proto: DpoProto,
        input: LookupInput,
    },
    /// Send over a tunnel adjacency
    Adjacency { index: AdjIndex, proto: DpoProto },
    /// Spread over several dpos
    LoadBalance(Arc<LoadBalance>),
}

impl Dpo {
    #[must_use]
    pub fn drop(proto: DpoProto) -> Self {
        Dpo::Drop(proto)
    }
    #[must_use]
    pub fn control_plane(proto: DpoProto) -> Self {
        Dpo::ControlPlane(proto)
    }
    #[must_use]
    pub fn src_lookup(table: FibIndex, proto: DpoProto) -> Self {
        Dpo::Lookup {
            table,
            proto,
            input: LookupInput::SrcAddr,
        }
    }
    #[must_use]
    pub fn adjacency(index: AdjIndex, proto: DpoProto) -> Self {
        Dpo::Adjacency { index, proto }
    }
    #[must_use]
    pub fn load_balance(lb: LoadBalance) -> Self {
        Dpo::LoadBalance(Arc::new(lb))
    }
    #[must_use]
    pub fn is_drop(&self) -> bool {
        matches!(self, Dpo::Drop(_))
    }
    #[must_use]
    pub fn proto(&self) -> DpoProto {
        match self {
            Dpo::Drop(proto) | Dpo::ControlPlane(proto) => *proto,
            Dpo::Lookup { proto, .. } | Dpo::Adjacency { proto, .. } => *proto,
            Dpo::LoadBalance(lb) => lb.proto,
        }
    }
}
