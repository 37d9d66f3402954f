// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The aggregate of forwarding state stores

use crate::adjacency::{AdjacencyTable, IfIndex};
use crate::errors::FibError;
use crate::graph::{BackWalkCtx, BackWalkReason, ChildNode};
use crate::pathlist::PathListTable;
use crate::table::FibTables;
use tracing::debug;

#[derive(Default)]
pub struct FibDb {
    pub tables: FibTables,
    pub adjacencies: AdjacencyTable,
    pub pathlists: PathListTable,
}

impl FibDb {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    ////////////////////////////////////////////////////////////////////////////////
    /// Change the state of an interface. Returns the context for the back-walk and
    /// the children of the path-lists affected by the change, each listed once.
    /// It is up to the caller to walk them.
    ////////////////////////////////////////////////////////////////////////////////
    pub fn set_interface_state(
        &mut self,
        ifindex: IfIndex,
        up: bool,
    ) -> Result<(BackWalkCtx, Vec<ChildNode>), FibError> {
        let reason = if up {
            BackWalkReason::AdjacencyUp
        } else {
            BackWalkReason::AdjacencyDown
        };
        let mut children: Vec<ChildNode> = vec![];
        for adj in self.adjacencies.set_interface_state(ifindex, up)? {
            for child in self.pathlists.children_of(adj) {
                if !children.contains(&child) {
                    children.push(child);
                }
            }
        }
        debug!("Interface {ifindex} change affects {} children", children.len());
        Ok((BackWalkCtx { reason }, children))
    }

    /// Drop the registry entries of objects that no longer exist
    pub fn purge(&mut self) -> usize {
        self.tables.purge() + self.adjacencies.purge() + self.pathlists.purge()
    }
}
