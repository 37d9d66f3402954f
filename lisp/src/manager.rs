// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The forwarding entry engine: adds, deletes and flushes entries, keeps the
//! forwarding of L2 entries in sync with their adjacencies, and shows entries.

use crate::bd::BridgeDomains;
use crate::config::LispGpeParams;
use crate::entry::{EntryFwd, FwdEntry, FwdEntryKind, FwdEntryRequest, IpFwd, L2Fwd};
use crate::errors::FwdEntryError;
use crate::key::EndpointId;
use crate::l2fib::{L2FibReader, L2FibWriter};
use crate::paths::build_paths;
use crate::pool::{FwdEntryIndex, FwdEntryPool};
use crate::tenant::TenantTable;
use crate::{l2, l3};
use fib::FibDb;
use fib::adjacency::IfIndex;
use fib::graph::{self, BackWalkCtx, BackWalkRc, FibNode, FibNodeType, NodeIndex};
use tracing::{debug, error, info, warn};

pub struct LispGpe {
    params: LispGpeParams,
    enabled: bool,
    pub(crate) fib: FibDb,
    pub(crate) tenants: TenantTable,
    pub(crate) bridge_domains: BridgeDomains,
    pub(crate) l2fib: L2FibWriter,
    pub(crate) entries: FwdEntryPool,
}

impl LispGpe {
    #[must_use]
    pub fn new(params: LispGpeParams) -> Self {
        let (l2fib, _) = L2FibWriter::new(params.l2fib_capacity);
        info!("Created {} (enabled:{})", params.name, params.enabled);
        Self {
            enabled: params.enabled,
            params,
            fib: FibDb::new(),
            tenants: TenantTable::new(),
            bridge_domains: BridgeDomains::new(),
            l2fib,
            entries: FwdEntryPool::new(),
        }
    }

    #[must_use]
    pub fn params(&self) -> &LispGpeParams {
        &self.params
    }
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
    pub fn enable(&mut self) {
        if !self.enabled {
            info!("Enabling {}", self.params.name);
            self.enabled = true;
        }
    }
    /// Disable the engine. Every entry is removed.
    pub fn disable(&mut self) {
        if self.enabled {
            info!("Disabling {}", self.params.name);
            self.flush();
            self.enabled = false;
        }
    }

    /// Forwarding state shared with the collaborators: tables, adjacencies and path-lists
    #[must_use]
    pub fn fib(&self) -> &FibDb {
        &self.fib
    }
    pub fn fib_mut(&mut self) -> &mut FibDb {
        &mut self.fib
    }
    #[must_use]
    pub fn entries(&self) -> &FwdEntryPool {
        &self.entries
    }
    /// A reader of the flat L2 table, for a forwarding thread
    #[must_use]
    pub fn l2fib_reader(&self) -> L2FibReader {
        self.l2fib.as_l2fib_reader()
    }
    #[must_use]
    pub fn l2fib(&self) -> &L2FibWriter {
        &self.l2fib
    }
    #[must_use]
    pub fn tenants(&self) -> &TenantTable {
        &self.tenants
    }

    /// Register an interface tunnels can egress through
    ///
    /// # Errors
    ///
    /// Fails if the interface is known.
    pub fn add_interface(&mut self, ifindex: IfIndex, up: bool) -> Result<(), FwdEntryError> {
        Ok(self.fib.adjacencies.add_interface(ifindex, up)?)
    }

    /// Register a bridge domain, returning its index
    ///
    /// # Errors
    ///
    /// Fails if no index is left.
    pub fn add_bridge_domain(&mut self, bd_id: u32) -> Result<u16, FwdEntryError> {
        self.bridge_domains.add(bd_id)
    }

    /// Unregister a bridge domain.
    ///
    /// # Errors
    ///
    /// Fails if the bridge domain is unknown or entries use it.
    pub fn del_bridge_domain(&mut self, bd_id: u32) -> Result<(), FwdEntryError> {
        let in_use = self
            .entries
            .iter()
            .any(|(_, e)| matches!(&e.fwd, EntryFwd::L2(fwd) if fwd.bd_id == bd_id));
        if in_use {
            return Err(FwdEntryError::InvalidOperation("bridge domain is in use"));
        }
        self.bridge_domains
            .del(bd_id)
            .map(|_| ())
            .ok_or(FwdEntryError::NoSuchBridgeDomain(bd_id))
    }

    /// Map a vni to the table its tunnels use
    ///
    /// # Errors
    ///
    /// Fails if entries of the vni exist and use another table.
    pub fn map_vni_to_table(&mut self, vni: u32, table_id: u32) -> Result<(), FwdEntryError> {
        self.tenants.map_vni_to_table(vni, table_id)
    }

    fn build_entry(&mut self, request: &FwdEntryRequest) -> Result<FwdEntry, FwdEntryError> {
        let key = request.key();
        let fwd = match (&key.remote, &key.local) {
            (EndpointId::IpPrefix(rmt), EndpointId::IpPrefix(lcl)) => {
                if rmt.protocol() != lcl.protocol() {
                    return Err(FwdEntryError::FamilyMismatch);
                }
                EntryFwd::Ip(IpFwd {
                    eid_table_id: request.table_id,
                    eid_fib: self
                        .fib
                        .tables
                        .find_or_create_and_lock(rmt.protocol(), request.table_id),
                    src_fib: None,
                })
            }
            (EndpointId::Mac(_), EndpointId::Mac(_)) => EntryFwd::L2(L2Fwd {
                bd_id: request.bd_id,
                bd_index: self.bridge_domains.find_index(request.bd_id)?,
                child: None,
                dpo: None,
            }),
            _ => return Err(FwdEntryError::UnsupportedEndpointKind),
        };
        let tenant = self.tenants.find_or_create(key.vni);
        let kind = request.kind();
        let paths = match kind {
            FwdEntryKind::Normal => {
                if request.locator_pairs.is_empty() {
                    return Err(FwdEntryError::InvalidOperation("entry has no locators"));
                }
                build_paths(&mut self.fib.adjacencies, &tenant, key.vni, &request.locator_pairs)?
            }
            FwdEntryKind::Negative(_) => vec![],
        };
        Ok(FwdEntry {
            key,
            kind,
            tenant,
            paths,
            fwd,
            installed: false,
        })
    }

    fn install(&mut self, index: FwdEntryIndex) -> Result<(), FwdEntryError> {
        let Some(entry) = self.entries.get_mut(index) else {
            return Err(FwdEntryError::InvalidOperation("no entry at index"));
        };
        match entry.fwd {
            EntryFwd::Ip(_) => l3::install(&mut self.fib, entry),
            EntryFwd::L2(_) => l2::install(&mut self.fib, &mut self.l2fib, index, entry),
        }
    }

    fn uninstall(&mut self, index: FwdEntryIndex) -> Result<(), FwdEntryError> {
        let Some(entry) = self.entries.get_mut(index) else {
            return Err(FwdEntryError::InvalidOperation("no entry at index"));
        };
        match entry.fwd {
            EntryFwd::Ip(_) => l3::uninstall(entry),
            EntryFwd::L2(_) => l2::uninstall(&mut self.l2fib, entry),
        }
    }

    /// Forget the registry entries of tables, adjacencies, path-lists and tenants
    /// released by entries.
    fn purge(&mut self) {
        let purged = self.fib.purge() + self.tenants.purge();
        if purged > 0 {
            debug!("Purged {purged} released objects");
        }
    }

    fn add_entry(&mut self, request: &FwdEntryRequest) -> Result<FwdEntryIndex, FwdEntryError> {
        let key = request.key();
        let entry = self.build_entry(request)?;
        let index = self.entries.insert(entry)?;
        if let Err(e) = self.install(index) {
            error!("Failed to install entry {key}: {e}");
            self.entries.remove(index);
            return Err(e);
        }
        Ok(index)
    }

    ////////////////////////////////////////////////////////////////////////////////
    /// Add a forwarding entry. Either the entry is added and installed, or nothing
    /// changes.
    ///
    /// # Errors
    ///
    /// Fails if the engine is disabled, if an entry with the same key exists, if
    /// the endpoints are not both prefixes of one family or both MACs, if the
    /// bridge domain is unknown, or if a locator does not resolve.
    ////////////////////////////////////////////////////////////////////////////////
    pub fn add(&mut self, request: &FwdEntryRequest) -> Result<FwdEntryIndex, FwdEntryError> {
        if !self.enabled {
            warn!("Refusing to add entry: {} is disabled", self.params.name);
            return Err(FwdEntryError::SubsystemDisabled);
        }
        let key = request.key();
        if self.entries.find(&key).is_some() {
            debug!("Entry {key} already exists");
            return Err(FwdEntryError::AlreadyExists(key));
        }
        let result = self.add_entry(request);
        match &result {
            Ok(_) => debug!("Added entry {key}"),
            Err(_) => self.purge(),
        }
        result
    }

    /// Delete the entry of the key of a request
    ///
    /// # Errors
    ///
    /// Fails if the engine is disabled or no entry has the key.
    pub fn delete(&mut self, request: &FwdEntryRequest) -> Result<(), FwdEntryError> {
        if !self.enabled {
            return Err(FwdEntryError::SubsystemDisabled);
        }
        let key = request.key();
        let Some(index) = self.entries.find(&key) else {
            debug!("Entry {key} does not exist");
            return Err(FwdEntryError::NotFound(key));
        };
        self.uninstall(index)?;
        self.entries.remove(index);
        self.purge();
        debug!("Deleted entry {key}");
        Ok(())
    }

    /// Add or delete, the way requests are usually received
    ///
    /// # Errors
    ///
    /// Fails as [`LispGpe::add`] or [`LispGpe::delete`] do.
    pub fn add_del(&mut self, request: &FwdEntryRequest, is_add: bool) -> Result<(), FwdEntryError> {
        if is_add {
            self.add(request).map(|_| ())
        } else {
            self.delete(request)
        }
    }

    /// Remove every entry. Returns the number of entries removed.
    pub fn flush(&mut self) -> usize {
        let mut cursor = self.entries.cursor();
        let mut count = 0;
        while let Some(index) = cursor.next(&self.entries) {
            if let Err(e) = self.uninstall(index) {
                error!("Failed to uninstall entry at {index:?}: {e}");
            }
            self.entries.remove(index);
            count += 1;
        }
        self.purge();
        if count > 0 {
            info!("Flushed {count} entries");
        }
        count
    }

    ////////////////////////////////////////////////////////////////////////////////
    /// Change the state of an interface, and update the forwarding of the
    /// entries using adjacencies over it. Returns the number of entries updated.
    ///
    /// # Errors
    ///
    /// Fails if the interface is unknown.
    ////////////////////////////////////////////////////////////////////////////////
    pub fn set_interface_state(&mut self, ifindex: IfIndex, up: bool) -> Result<usize, FwdEntryError> {
        let (ctx, children) = self.fib.set_interface_state(ifindex, up)?;
        Ok(graph::walk(&children, &ctx, self))
    }
}

impl FibNode for LispGpe {
    fn node_type(&self) -> FibNodeType {
        FibNodeType::LispGpeFwdEntry
    }
    fn back_walk(&mut self, index: NodeIndex, ctx: &BackWalkCtx) -> BackWalkRc {
        let Some(entry) = self.entries.get_mut(index) else {
            warn!("Back-walk ({:?}) of stale entry {index:?}", ctx.reason);
            return BackWalkRc::Continue;
        };
        if let Err(e) = l2::update_forwarding(&mut self.l2fib, entry) {
            error!("Failed to update entry {}: {e}", entry.key);
        }
        BackWalkRc::Continue
    }
}
