// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Forwarding objects consumed by the overlay forwarding-entry engine: prefix tables,
//! data-path objects, shared adjacencies, path-lists and the back-walk graph that ties
//! them together.

#![allow(clippy::similar_names)]

pub mod adjacency;
mod display;
pub mod dpo;
mod errors;
pub mod fibdb;
pub mod graph;
pub mod pathlist;
pub mod prefix;
pub mod table;

// re-exports
pub use errors::FibError;
pub use fibdb::FibDb;
