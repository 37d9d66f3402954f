// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Module that implements Display for fib objects

use crate::adjacency::{AdjIndex, Adjacency, IfIndex};
use crate::dpo::{Dpo, DpoProto, LoadBalance, LookupInput};
use crate::pathlist::{PathList, PathListIndex};
use crate::table::{FibIndex, FibSource, FibTable};
use std::fmt::Display;

const LINE_WIDTH: usize = 81;

struct Heading<'a>(&'a str);
impl Display for Heading<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = LINE_WIDTH.saturating_sub(self.0.len() + 2) / 2;
        write!(f, " {0:─<width$}", "─", width = len)?;
        write!(f, " {} ", self.0)?;
        writeln!(f, " {0:─<width$}", "─", width = len)
    }
}

impl Display for IfIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl Display for AdjIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl Display for FibIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl Display for PathListIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl Display for DpoProto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DpoProto::Ip4 => write!(f, "ip4"),
            DpoProto::Ip6 => write!(f, "ip6"),
            DpoProto::Ethernet => write!(f, "ethernet"),
        }
    }
}
impl Display for FibSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FibSource::Api => write!(f, "API"),
            FibSource::Lisp => write!(f, "LISP"),
        }
    }
}

impl Display for LoadBalance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[@{}]: load-balance buckets:{}", self.proto, self.buckets.len())?;
        for (n, bucket) in self.buckets.iter().enumerate() {
            write!(f, "\n    [{n}] w:{} {}", bucket.weight, bucket.dpo)?;
        }
        Ok(())
    }
}

impl Display for Dpo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dpo::Drop(proto) => write!(f, "[@{proto}]: dpo-drop"),
            Dpo::ControlPlane(proto) => write!(f, "[@{proto}]: lisp-cp"),
            Dpo::Lookup {
                table,
                proto,
                input,
            } => {
                let input = match input {
                    LookupInput::SrcAddr => "src",
                    LookupInput::DstAddr => "dst",
                };
                write!(f, "[@{proto}]: {input}-lookup in fib-index:{table}")
            }
            Dpo::Adjacency { index, proto } => write!(f, "[@{proto}]: adj:[{index}]"),
            Dpo::LoadBalance(lb) => lb.fmt(f),
        }
    }
}

impl Display for Adjacency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let nh = self.nexthop();
        write!(
            f,
            "adj:[{}] {} -> {} ifindex:{} vni:{} {}",
            self.index(),
            nh.lcl_loc,
            nh.rmt_loc,
            nh.ifindex,
            self.key().vni,
            if self.is_usable() { "up" } else { "down" }
        )
    }
}

impl Display for PathList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "path-list:[{}] children:{}", self.index(), self.num_children())?;
        for path in self.paths() {
            write!(
                f,
                "\n  preference:{} weight:{} {}",
                path.preference, path.weight, path.adjacency
            )?;
        }
        Ok(())
    }
}

impl Display for FibTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let title = format!("{} fib-index {} ({})", self.proto(), self.index(), self.description());
        Heading(&title).fmt(f)?;
        for route in self.routes() {
            writeln!(f, " {} src:{} {:?}", route.prefix, route.source, route.flags)?;
            writeln!(f, "   {}", route.forwarding)?;
        }
        Ok(())
    }
}
