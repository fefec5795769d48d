//! Request contexts injected by the auth middleware.
//!
//! The resolved tenant is an explicit value threaded through request
//! extensions, never module-level mutable state, so handlers and tests see
//! exactly what the resolvers produced.

use tidecrm_audit::RequestMeta;
use tidecrm_core::{AuthError, AuthResult, Principal, Role, TenantId};

/// Tenant context for a request. Always present on authenticated routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    tenant_id: TenantId,
}

impl TenantContext {
    pub fn new(tenant_id: TenantId) -> Self {
        Self { tenant_id }
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

/// Principal context for a request: the acting principal's current stored
/// state, as re-read by the credential verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}

/// Effective-role context: `None` when the principal holds no role in the
/// resolved tenant. Role-agnostic handlers (join, discover) accept `None`;
/// everything else goes through [`RoleContext::require`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleContext {
    role: Option<Role>,
}

impl RoleContext {
    pub fn new(role: Option<Role>) -> Self {
        Self { role }
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// The effective role, or `ForbiddenTenant` for non-members.
    pub fn require(&self, tenant: &TenantContext) -> AuthResult<Role> {
        self.role
            .ok_or_else(|| AuthError::ForbiddenTenant(tenant.tenant_id().to_string()))
    }
}

/// Caller metadata captured for audit entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMetaContext(pub RequestMeta);
