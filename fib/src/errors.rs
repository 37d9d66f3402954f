// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The error results used by this library.

use crate::adjacency::IfIndex;
use crate::prefix::{FibProtocol, Prefix};
use crate::table::FibIndex;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FibError {
    #[error("No interface with ifindex {0}")]
    NoSuchInterface(IfIndex),

    #[error("An interface with ifindex {0} already exists")]
    InterfaceExists(IfIndex),

    #[error("No fib table with index {0}")]
    NoSuchTable(FibIndex),

    #[error("No route for {0}")]
    NoSuchRoute(Prefix),

    #[error("Protocol mismatch: table is {0}, prefix is {1}")]
    ProtocolMismatch(FibProtocol, FibProtocol),

    #[error("A path-list needs at least one path")]
    EmptyPathList,
}
