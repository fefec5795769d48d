//! Role Resolver: compute the effective role for (principal, tenant).
//!
//! Two authorization models exist; the choice is made once at startup by
//! constructing the matching strategy. Handlers never branch on the model.

use core::str::FromStr;
use std::sync::Arc;

use tidecrm_core::{AuthError, AuthResult, Principal, PrincipalId, Role, TenantId};

/// Narrow membership lookup the membership resolver needs from storage.
pub trait MembershipDirectory: Send + Sync {
    fn membership_role(&self, principal: PrincipalId, tenant: &TenantId)
        -> AuthResult<Option<Role>>;
}

impl<D> MembershipDirectory for Arc<D>
where
    D: MembershipDirectory + ?Sized,
{
    fn membership_role(
        &self,
        principal: PrincipalId,
        tenant: &TenantId,
    ) -> AuthResult<Option<Role>> {
        (**self).membership_role(principal, tenant)
    }
}

/// Strategy computing the effective role used for authorization decisions.
///
/// Returns `Ok(None)` when the principal holds no role in the requested
/// tenant. Only the explicitly role-agnostic operations (join, discover)
/// proceed without a role; everything else converts `None` into
/// [`AuthError::ForbiddenTenant`].
///
/// Implementations must be pure functions of current stored state: no
/// caching across requests, so a role change is visible to the very next
/// request from any client.
pub trait RoleResolver: Send + Sync {
    fn effective_role(&self, principal: &Principal, tenant: &TenantId)
        -> AuthResult<Option<Role>>;
}

/// Global-role model: the principal's global role applies everywhere; the
/// tenant only scopes data, never authority.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobalRoleResolver;

impl RoleResolver for GlobalRoleResolver {
    fn effective_role(
        &self,
        principal: &Principal,
        _tenant: &TenantId,
    ) -> AuthResult<Option<Role>> {
        Ok(Some(principal.role))
    }
}

/// Membership model: authority comes from the (principal, tenant) membership
/// row. No membership, no role.
///
/// There is no special case for a super-principal here: the guarantee that
/// every tenant has a reachable owner is enforced at tenant-creation time by
/// granting the configured root principal an owner membership.
pub struct MembershipRoleResolver<D> {
    directory: D,
}

impl<D: MembershipDirectory> MembershipRoleResolver<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }
}

impl<D: MembershipDirectory> RoleResolver for MembershipRoleResolver<D> {
    fn effective_role(&self, principal: &Principal, tenant: &TenantId)
        -> AuthResult<Option<Role>> {
        self.directory.membership_role(principal.id, tenant)
    }
}

/// Which authorization model is active, selected once at startup.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum AuthzModel {
    Global,
    #[default]
    Membership,
}

impl FromStr for AuthzModel {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(AuthzModel::Global),
            "membership" => Ok(AuthzModel::Membership),
            other => Err(AuthError::invalid_argument(format!(
                "unknown authorization model '{other}'"
            ))),
        }
    }
}
