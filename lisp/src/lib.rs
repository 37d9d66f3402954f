// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Control plane of overlay tunnel forwarding entries (LISP-GPE). Entries match
//! traffic by remote and local endpoint (IP prefixes or MACs) within a VNI and send
//! it over tunnel adjacencies. Entries routed by prefix are installed as a chain of
//! destination and source prefix tables; L2 entries are installed in a flat table
//! that forwarding threads read concurrently.

pub mod bd;
pub mod config;
mod display;
pub mod entry;
mod errors;
pub mod key;
pub mod l2;
pub mod l2fib;
pub mod l3;
pub mod logging;
pub mod mac;
pub mod manager;
pub mod paths;
pub mod pool;
pub mod tenant;

#[cfg(test)]
mod test;

// re-exports
pub use config::{LispGpeParams, LispGpeParamsBuilder};
pub use entry::{FwdEntryRequest, NegativeAction};
pub use errors::{ErrorCode, FwdEntryError};
pub use key::{EndpointId, FwdEntryKey};
pub use mac::Mac;
pub use manager::LispGpe;
