//! In-memory store implementations for tests and local development.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use tidecrm_auth::OwnershipFilter;
use tidecrm_core::{
    Membership, Principal, PrincipalId, RecordId, RecordKind, ResourceRecord, Role, Tenant,
    TenantId,
};

use crate::store::{
    MembershipStore, PrincipalStore, RecordStore, StoreError, StoreResult, TenantStore,
};

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

#[derive(Debug, Default)]
pub struct InMemoryPrincipalStore {
    inner: RwLock<HashMap<PrincipalId, Principal>>,
}

impl InMemoryPrincipalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PrincipalStore for InMemoryPrincipalStore {
    fn get(&self, id: PrincipalId) -> StoreResult<Option<Principal>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    fn get_by_email(&self, email: &str) -> StoreResult<Option<Principal>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().find(|p| p.email == email).cloned())
    }

    fn insert(&self, principal: Principal) -> StoreResult<bool> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.values().any(|p| p.email == principal.email) {
            return Ok(false);
        }
        map.insert(principal.id, principal);
        Ok(true)
    }

    fn set_active(&self, id: PrincipalId, active: bool) -> StoreResult<Option<Principal>> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.get_mut(&id).map(|p| {
            p.active = active;
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    fn set_role(&self, id: PrincipalId, role: Role) -> StoreResult<Option<Role>> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.get_mut(&id).map(|p| {
            let previous = p.role;
            p.role = role;
            p.updated_at = Utc::now();
            previous
        }))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTenantStore {
    inner: RwLock<HashMap<TenantId, Tenant>>,
}

impl InMemoryTenantStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TenantStore for InMemoryTenantStore {
    fn get(&self, id: &TenantId) -> StoreResult<Option<Tenant>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(id).cloned())
    }

    fn insert(&self, tenant: Tenant) -> StoreResult<bool> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(&tenant.id) {
            return Ok(false);
        }
        map.insert(tenant.id.clone(), tenant);
        Ok(true)
    }

    fn delete(&self, id: &TenantId) -> StoreResult<bool> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.remove(id).is_some())
    }

    fn list(&self) -> StoreResult<Vec<Tenant>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let mut tenants: Vec<Tenant> = map.values().cloned().collect();
        tenants.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(tenants)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryMembershipStore {
    inner: RwLock<HashMap<(PrincipalId, TenantId), Membership>>,
}

impl InMemoryMembershipStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MembershipStore for InMemoryMembershipStore {
    fn role_of(&self, principal: PrincipalId, tenant: &TenantId) -> StoreResult<Option<Role>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&(principal, tenant.clone())).map(|m| m.role))
    }

    fn insert(&self, membership: Membership) -> StoreResult<bool> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let key = (membership.principal_id, membership.tenant_id.clone());
        if map.contains_key(&key) {
            return Ok(false);
        }
        map.insert(key, membership);
        Ok(true)
    }

    fn set_role(
        &self,
        principal: PrincipalId,
        tenant: &TenantId,
        role: Role,
    ) -> StoreResult<Option<Role>> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.get_mut(&(principal, tenant.clone())).map(|m| {
            let previous = m.role;
            m.role = role;
            m.updated_at = Utc::now();
            previous
        }))
    }

    fn list_for_tenant(&self, tenant: &TenantId) -> StoreResult<Vec<Membership>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map
            .values()
            .filter(|m| &m.tenant_id == tenant)
            .cloned()
            .collect())
    }

    fn delete_tenant(&self, tenant: &TenantId) -> StoreResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.retain(|(_, t), _| t != tenant);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    inner: RwLock<HashMap<(TenantId, RecordKind, RecordId), ResourceRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn get(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
        id: RecordId,
    ) -> StoreResult<Option<ResourceRecord>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&(tenant.clone(), kind, id)).cloned())
    }

    fn insert(&self, record: ResourceRecord) -> StoreResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert((record.tenant_id.clone(), record.kind, record.id), record);
        Ok(())
    }

    fn update(&self, record: ResourceRecord) -> StoreResult<()> {
        self.insert(record)
    }

    fn delete(&self, tenant: &TenantId, kind: RecordKind, id: RecordId) -> StoreResult<bool> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.remove(&(tenant.clone(), kind, id)).is_some())
    }

    fn list(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
        filter: &OwnershipFilter,
        limit: Option<usize>,
    ) -> StoreResult<Vec<ResourceRecord>> {
        let map = self.inner.read().map_err(|_| poisoned())?;

        // The ownership filter is applied while scanning, before the limit,
        // so a truncated page is a page of *visible* records.
        let mut records: Vec<ResourceRecord> = map
            .values()
            .filter(|r| &r.tenant_id == tenant && r.kind == kind && filter.allows(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.as_uuid().cmp(b.id.as_uuid())));

        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records)
    }
}
