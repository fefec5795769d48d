//! Storage collaborator contracts.
//!
//! Key/predicate lookup and single-row update/insert over principals,
//! tenants, memberships, and records. Each trait is deliberately narrow:
//! handlers and services never see storage syntax, and the ownership filter
//! is interpreted inside the store so pagination stays correct.

use thiserror::Error;

use tidecrm_auth::OwnershipFilter;
use tidecrm_core::{
    AuthError, Membership, Principal, PrincipalId, RecordId, RecordKind, ResourceRecord, Role,
    Tenant, TenantId,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        AuthError::internal(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait PrincipalStore: Send + Sync {
    fn get(&self, id: PrincipalId) -> StoreResult<Option<Principal>>;
    fn get_by_email(&self, email: &str) -> StoreResult<Option<Principal>>;
    /// Insert a new principal. Returns `false` when the email is taken.
    fn insert(&self, principal: Principal) -> StoreResult<bool>;
    /// Single-row update of the active flag. Returns the updated row.
    fn set_active(&self, id: PrincipalId, active: bool) -> StoreResult<Option<Principal>>;
    /// Single-row update of the global role. Returns the previous role.
    fn set_role(&self, id: PrincipalId, role: Role) -> StoreResult<Option<Role>>;
}

pub trait TenantStore: Send + Sync {
    fn get(&self, id: &TenantId) -> StoreResult<Option<Tenant>>;
    /// Insert a new tenant. Returns `false` when the identifier is taken.
    fn insert(&self, tenant: Tenant) -> StoreResult<bool>;
    fn delete(&self, id: &TenantId) -> StoreResult<bool>;
    fn list(&self) -> StoreResult<Vec<Tenant>>;
}

pub trait MembershipStore: Send + Sync {
    fn role_of(&self, principal: PrincipalId, tenant: &TenantId) -> StoreResult<Option<Role>>;
    /// Insert a new membership. Returns `false` on a duplicate pair.
    fn insert(&self, membership: Membership) -> StoreResult<bool>;
    /// Single-row update of the tenant-scoped role. Returns the previous role.
    fn set_role(
        &self,
        principal: PrincipalId,
        tenant: &TenantId,
        role: Role,
    ) -> StoreResult<Option<Role>>;
    fn list_for_tenant(&self, tenant: &TenantId) -> StoreResult<Vec<Membership>>;
    /// Remove every membership of a tenant (tenant deletion).
    fn delete_tenant(&self, tenant: &TenantId) -> StoreResult<()>;
}

pub trait RecordStore: Send + Sync {
    fn get(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
        id: RecordId,
    ) -> StoreResult<Option<ResourceRecord>>;
    fn insert(&self, record: ResourceRecord) -> StoreResult<()>;
    fn update(&self, record: ResourceRecord) -> StoreResult<()>;
    fn delete(&self, tenant: &TenantId, kind: RecordKind, id: RecordId) -> StoreResult<bool>;
    /// List with the ownership filter conjoined at the query layer (never
    /// post-filtered), creation-time ascending, truncated to `limit`.
    fn list(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
        filter: &OwnershipFilter,
        limit: Option<usize>,
    ) -> StoreResult<Vec<ResourceRecord>>;
}
