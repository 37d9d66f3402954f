// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Installation of L2 entries in the flat table. A normal entry subscribes to the
//! path-list of its paths, so that it is walked, and its flat table action
//! recomputed, when the adjacencies of the path-list change.

use crate::entry::{EntryFwd, FwdEntry, FwdEntryKind, L2Fwd};
use crate::errors::FwdEntryError;
use crate::l2fib::L2FibWriter;
use crate::mac::Mac;
use crate::paths::mk_route_paths;
use crate::pool::FwdEntryIndex;
use fib::FibDb;
use fib::dpo::FwdChainType;
use fib::graph::{ChildNode, FibNodeType};
use fib::pathlist::PathList;
use tracing::debug;

fn macs(entry: &FwdEntry) -> Result<(Mac, Mac), FwdEntryError> {
    match (entry.key.remote.as_mac(), entry.key.local.as_mac()) {
        (Some(rmt), Some(lcl)) => Ok((*rmt, *lcl)),
        _ => Err(FwdEntryError::UnsupportedEndpointKind),
    }
}

fn l2_fwd(entry: &mut FwdEntry) -> Result<&mut L2Fwd, FwdEntryError> {
    match &mut entry.fwd {
        EntryFwd::L2(fwd) => Ok(fwd),
        EntryFwd::Ip(_) => Err(FwdEntryError::UnsupportedEndpointKind),
    }
}

/// Install an entry. `index` is the index of the entry in the pool, used to
/// subscribe the entry to its path-list.
///
/// # Errors
///
/// Fails if the entry is installed or is not an L2 entry.
pub fn install(
    fib: &mut FibDb,
    l2fib: &mut L2FibWriter,
    index: FwdEntryIndex,
    entry: &mut FwdEntry,
) -> Result<(), FwdEntryError> {
    if entry.installed {
        return Err(FwdEntryError::InvalidOperation("entry is already installed"));
    }
    let (rmt, lcl) = macs(entry)?;
    let route_paths = mk_route_paths(&entry.paths);
    let normal = entry.kind == FwdEntryKind::Normal;
    let fwd = l2_fwd(entry)?;

    let dpo = if normal {
        let pl = fib.pathlists.create(route_paths)?;
        let child = PathList::child_add(&pl, ChildNode::new(FibNodeType::LispGpeFwdEntry, index));
        let dpo = pl.contribute_forwarding(FwdChainType::Ethernet);
        fwd.child = Some(child);
        dpo
    } else {
        l2fib.miss()
    };
    l2fib.add(fwd.bd_index, &lcl, &rmt, dpo.clone());
    fwd.dpo = Some(dpo);
    entry.installed = true;
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////
/// Recompute the action of an installed entry from its path-list and write it to
/// the flat table. The paths of the entry are left untouched.
////////////////////////////////////////////////////////////////////////////////
pub fn update_forwarding(l2fib: &mut L2FibWriter, entry: &mut FwdEntry) -> Result<(), FwdEntryError> {
    if !entry.installed {
        return Err(FwdEntryError::InvalidOperation("entry is not installed"));
    }
    let (rmt, lcl) = macs(entry)?;
    let fwd = l2_fwd(entry)?;
    let dpo = match &fwd.child {
        Some(child) => child.pathlist().contribute_forwarding(FwdChainType::Ethernet),
        None => l2fib.miss(),
    };
    debug!("Updating l2 entry bd:{} {lcl} -> {rmt}", fwd.bd_id);
    l2fib.add(fwd.bd_index, &lcl, &rmt, dpo.clone());
    fwd.dpo = Some(dpo);
    Ok(())
}

/// Remove an entry from the flat table, releasing its path-list subscription
/// and its adjacencies.
///
/// # Errors
///
/// Fails if the entry is not an L2 entry.
pub fn uninstall(l2fib: &mut L2FibWriter, entry: &mut FwdEntry) -> Result<(), FwdEntryError> {
    let (rmt, lcl) = macs(entry)?;
    let fwd = l2_fwd(entry)?;
    fwd.child = None;
    fwd.dpo = None;
    let bd_index = fwd.bd_index;
    entry.paths.clear();
    l2fib.del(bd_index, &lcl, &rmt);
    entry.installed = false;
    Ok(())
}
