// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Installation of entries routed by prefix. The remote prefix is routed in the
//! table of the entry to a lookup of the source address in a per-destination source
//! table. The local prefix is routed in the source table over the paths of the
//! entry. Entries with the same remote prefix share the source table.

use crate::entry::{EntryFwd, FwdEntry, FwdEntryKind, IpFwd};
use crate::errors::FwdEntryError;
use crate::paths::mk_route_paths;
use fib::FibDb;
use fib::dpo::{Dpo, DpoProto};
use fib::prefix::Prefix;
use fib::table::{FibEntryFlags, FibSource, FibTableRef, SourceData};
use std::rc::Rc;
use tracing::{debug, error};

fn prefixes(entry: &FwdEntry) -> Result<(Prefix, Prefix), FwdEntryError> {
    match (entry.key.remote.as_prefix(), entry.key.local.as_prefix()) {
        (Some(rmt), Some(lcl)) => Ok((*rmt, *lcl)),
        _ => Err(FwdEntryError::UnsupportedEndpointKind),
    }
}

fn ip_fwd(entry: &mut FwdEntry) -> Result<&mut IpFwd, FwdEntryError> {
    match &mut entry.fwd {
        EntryFwd::Ip(fwd) => Ok(fwd),
        EntryFwd::L2(_) => Err(FwdEntryError::UnsupportedEndpointKind),
    }
}

////////////////////////////////////////////////////////////////////////////////
/// Get the source table for a destination prefix, creating it and the route to it
/// if no entry created them yet.
////////////////////////////////////////////////////////////////////////////////
fn dst_route_add(
    fib: &mut FibDb,
    eid_fib: &FibTableRef,
    dst: &Prefix,
) -> Result<FibTableRef, FwdEntryError> {
    if eid_fib.is_sourced(dst, FibSource::Lisp) {
        return match eid_fib.get_source_data(dst, FibSource::Lisp) {
            Some(SourceData::SrcFib(src_fib)) => Ok(src_fib),
            None => {
                error!("Route to {dst} has no source table");
                Err(FwdEntryError::InvalidOperation("route has no source table"))
            }
        };
    }
    let proto = dst.protocol();
    let description = format!("LISP-src for [{},{dst}]", eid_fib.index());
    let src_fib = fib.tables.create_and_lock(proto, &description);
    let lookup = Dpo::src_lookup(src_fib.index(), DpoProto::from(proto));
    eid_fib.entry_special_dpo_add(dst, FibSource::Lisp, FibEntryFlags::EXCLUSIVE, lookup)?;
    if let Err(e) = eid_fib.set_source_data(dst, FibSource::Lisp, SourceData::SrcFib(src_fib.clone())) {
        eid_fib.entry_delete(dst, FibSource::Lisp);
        return Err(e.into());
    }
    Ok(src_fib)
}

/// Remove the route to a source table once no entry uses the table. `src_fib` is
/// the handle of the caller, which must no longer be held by its entry.
fn dst_route_release(eid_fib: &FibTableRef, dst: &Prefix, src_fib: &FibTableRef) {
    /* the route to the table holds one handle and the caller another */
    if src_fib.num_entries(FibSource::Lisp) == 0 && Rc::strong_count(src_fib) <= 2 {
        debug!("Removing route to {dst} and its source table {}", src_fib.index());
        eid_fib.entry_delete(dst, FibSource::Lisp);
    }
}

/// Install the routes of an entry. The route to the source table is always
/// created; negative entries deferring to native routing install nothing in it.
///
/// # Errors
///
/// Fails if the entry is installed or is not an entry routed by prefix, or if
/// the tables refuse a route.
pub fn install(fib: &mut FibDb, entry: &mut FwdEntry) -> Result<(), FwdEntryError> {
    if entry.installed {
        return Err(FwdEntryError::InvalidOperation("entry is already installed"));
    }
    let (rmt, lcl) = prefixes(entry)?;
    let kind = entry.kind;
    let route_paths = mk_route_paths(&entry.paths);
    let fwd = ip_fwd(entry)?;

    let eid_fib = fwd.eid_fib.clone();
    let src_fib = dst_route_add(fib, &eid_fib, &rmt)?;

    let result = match kind {
        FwdEntryKind::Negative(action) => match action.dpo(DpoProto::from(rmt.protocol())) {
            None => {
                debug!("Entry {lcl} -> {rmt} defers to native routing");
                Ok(())
            }
            Some(_) if src_fib.is_sourced(&lcl, FibSource::Lisp) => Ok(()),
            Some(dpo) => {
                src_fib.entry_special_dpo_add(&lcl, FibSource::Lisp, FibEntryFlags::EXCLUSIVE, dpo)
            }
        },
        FwdEntryKind::Normal => fib
            .pathlists
            .create(route_paths)
            .and_then(|pl| src_fib.entry_update(&lcl, FibSource::Lisp, FibEntryFlags::empty(), pl)),
    };
    if let Err(e) = result {
        dst_route_release(&eid_fib, &rmt, &src_fib);
        return Err(e.into());
    }
    debug!(
        "Installed {lcl} -> {rmt} in fib-index {} via fib-index {}",
        eid_fib.index(),
        src_fib.index()
    );
    fwd.src_fib = Some(src_fib);
    entry.installed = true;
    Ok(())
}

/// Remove the routes of an entry. The route to the source table and the table
/// itself go away with the last entry using them.
///
/// # Errors
///
/// Fails if the entry is not installed.
pub fn uninstall(entry: &mut FwdEntry) -> Result<(), FwdEntryError> {
    if !entry.installed {
        return Err(FwdEntryError::InvalidOperation("entry is not installed"));
    }
    let (rmt, lcl) = prefixes(entry)?;
    let native = matches!(entry.kind, FwdEntryKind::Negative(a) if a.is_native());
    let fwd = ip_fwd(entry)?;
    if let Some(src_fib) = fwd.src_fib.take() {
        if !native {
            src_fib.entry_delete(&lcl, FibSource::Lisp);
        }
        dst_route_release(&fwd.eid_fib, &rmt, &src_fib);
    }
    entry.installed = false;
    Ok(())
}
