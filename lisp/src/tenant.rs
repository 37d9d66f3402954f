// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Tenants. A tenant is the overlay network of a VNI and the table its tunnels
//! belong to. Tenants are shared by the entries of the same VNI and disappear with
//! the last of them.

use crate::errors::FwdEntryError;
use ahash::RandomState;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use tracing::debug;

#[derive(Debug, PartialEq, Eq)]
pub struct Tenant {
    pub vni: u32,
    pub table_id: u32,
}

pub struct TenantTable {
    tenants: HashMap<u32, Weak<Tenant>, RandomState>,
    vrfs: HashMap<u32, u32, RandomState>,
}

impl Default for TenantTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TenantTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tenants: HashMap::with_hasher(RandomState::with_seed(0)),
            vrfs: HashMap::with_hasher(RandomState::with_seed(0)),
        }
    }

    /// The table id of a vni. Unless mapped otherwise, a vni uses the table with
    /// the same id.
    #[must_use]
    pub fn table_id(&self, vni: u32) -> u32 {
        self.vrfs.get(&vni).copied().unwrap_or(vni)
    }

    /// Map a vni to a table.
    ///
    /// # Errors
    ///
    /// Fails if the tenant of the vni exists and uses another table.
    pub fn map_vni_to_table(&mut self, vni: u32, table_id: u32) -> Result<(), FwdEntryError> {
        if let Some(tenant) = self.get(vni) {
            if tenant.table_id != table_id {
                return Err(FwdEntryError::InvalidOperation("vni is in use by entries"));
            }
        }
        debug!("Mapped vni {vni} to table {table_id}");
        self.vrfs.insert(vni, table_id);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, vni: u32) -> Option<Rc<Tenant>> {
        self.tenants.get(&vni).and_then(Weak::upgrade)
    }

    pub fn find_or_create(&mut self, vni: u32) -> Rc<Tenant> {
        if let Some(tenant) = self.get(vni) {
            return tenant;
        }
        let tenant = Rc::new(Tenant {
            vni,
            table_id: self.table_id(vni),
        });
        debug!("Created tenant for vni {vni} (table {})", tenant.table_id);
        self.tenants.insert(vni, Rc::downgrade(&tenant));
        tenant
    }

    /// Number of tenants alive
    #[must_use]
    pub fn len(&self) -> usize {
        self.tenants.values().filter(|t| t.strong_count() > 0).count()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn purge(&mut self) -> usize {
        let len = self.tenants.len();
        self.tenants.retain(|_, t| t.strong_count() > 0);
        len - self.tenants.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_sharing_and_mapping() {
        let mut tenants = TenantTable::new();
        let t1 = tenants.find_or_create(100);
        let t2 = tenants.find_or_create(100);
        assert!(Rc::ptr_eq(&t1, &t2));
        assert_eq!(t1.table_id, 100);

        assert!(tenants.map_vni_to_table(100, 5).is_err());
        assert!(tenants.map_vni_to_table(100, 100).is_ok());
        drop((t1, t2));
        assert!(tenants.is_empty());

        tenants.map_vni_to_table(100, 5).unwrap();
        assert_eq!(tenants.find_or_create(100).table_id, 5);
        assert_eq!(tenants.purge(), 1);
    }
}
