// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The dependency graph between forwarding objects. Objects that depend on a
//! path-list register as its children. When something the path-list uses changes
//! (e.g. an adjacency goes down) its children are walked so that they can
//! recompute the forwarding they derive from it.

use tracing::debug;

/// Identifies a child object within the pool of its type
pub type NodeIndex = generational_arena::Index;

/// The types of objects that can be children in the graph
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum FibNodeType {
    LispGpeFwdEntry,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ChildNode {
    pub node_type: FibNodeType,
    pub index: NodeIndex,
}

impl ChildNode {
    #[must_use]
    pub fn new(node_type: FibNodeType, index: NodeIndex) -> Self {
        Self { node_type, index }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BackWalkReason {
    AdjacencyUp,
    AdjacencyDown,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BackWalkCtx {
    pub reason: BackWalkReason,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BackWalkRc {
    Continue,
    Stop,
}

/// Implemented by the owner of a pool of child objects. The owner is handed the
/// index of the child being walked since the child alone cannot reach the state
/// it must update.
pub trait FibNode {
    fn node_type(&self) -> FibNodeType;
    fn back_walk(&mut self, index: NodeIndex, ctx: &BackWalkCtx) -> BackWalkRc;
}

/// Walk the children owned by `owner`. Children of other types are skipped.
/// Returns the number of children visited.
pub fn walk(children: &[ChildNode], ctx: &BackWalkCtx, owner: &mut dyn FibNode) -> usize {
    let node_type = owner.node_type();
    let mut visited = 0;
    for child in children.iter().filter(|c| c.node_type == node_type) {
        visited += 1;
        if owner.back_walk(child.index, ctx) == BackWalkRc::Stop {
            debug!("Back-walk ({:?}) stopped at {:?}", ctx.reason, child.index);
            break;
        }
    }
    visited
}
