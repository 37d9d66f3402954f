// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Building the paths of an entry from the locator pairs of a request

use crate::entry::LocatorPair;
use crate::errors::FwdEntryError;
use crate::tenant::Tenant;
use fib::adjacency::{Adjacency, AdjacencyTable};
use fib::pathlist::RoutePath;
use std::rc::Rc;

/// A path of an entry. Holding it keeps the adjacency alive.
#[derive(Debug, Clone)]
pub struct Path {
    pub priority: u8,
    pub weight: u8,
    pub adjacency: Rc<Adjacency>,
}

////////////////////////////////////////////////////////////////////////////////
/// Resolve the adjacency of every locator pair and return the paths sorted by
/// priority, best (lowest) first. Paths of equal priority keep their relative
/// order. On failure, the adjacencies already resolved are released.
////////////////////////////////////////////////////////////////////////////////
pub fn build_paths(
    adjacencies: &mut AdjacencyTable,
    tenant: &Tenant,
    vni: u32,
    candidates: &[LocatorPair],
) -> Result<Vec<Path>, FwdEntryError> {
    let mut paths = candidates
        .iter()
        .map(|pair| -> Result<Path, FwdEntryError> {
            let adjacency = adjacencies
                .find_or_create_and_lock(&pair.next_hop, tenant.table_id, vni)
                .map_err(FwdEntryError::AdjacencyResolution)?;
            Ok(Path {
                priority: pair.priority,
                weight: pair.weight.max(1),
                adjacency,
            })
        })
        .collect::<Result<Vec<Path>, FwdEntryError>>()?;
    paths.sort_by_key(|path| path.priority);
    Ok(paths)
}

/// The route paths to give a path-list. The priority of a path becomes its
/// preference.
#[must_use]
pub fn mk_route_paths(paths: &[Path]) -> Vec<RoutePath> {
    paths
        .iter()
        .map(|p| RoutePath::new(p.adjacency.clone(), u32::from(p.weight), p.priority))
        .collect()
}
