//! Administrative surface: tenant lifecycle, role mutation, account toggle.
//!
//! Each operation is gated by the decision engine / state machine and emits
//! exactly one audit entry on success. Audit appends are best-effort and
//! never fail the guarded mutation.

use std::sync::Arc;

use tidecrm_audit::{actions, AuditEntry, AuditRecorder, AuditStore, RequestMeta};
use tidecrm_auth::{authorize_role_change, AuthzModel, RoleTransition};
use tidecrm_core::{
    AuthError, AuthResult, Membership, Principal, PrincipalId, Role, Tenant, TenantId,
};

use crate::store::{MembershipStore, PrincipalStore, TenantStore};

pub struct AdminService {
    principals: Arc<dyn PrincipalStore>,
    tenants: Arc<dyn TenantStore>,
    memberships: Arc<dyn MembershipStore>,
    audit: AuditRecorder<Arc<dyn AuditStore>>,
    reserved_tenant: TenantId,
    root_email: Option<String>,
    model: AuthzModel,
}

impl AdminService {
    pub fn new(
        principals: Arc<dyn PrincipalStore>,
        tenants: Arc<dyn TenantStore>,
        memberships: Arc<dyn MembershipStore>,
        audit: AuditRecorder<Arc<dyn AuditStore>>,
        reserved_tenant: TenantId,
        root_email: Option<String>,
        model: AuthzModel,
    ) -> Self {
        Self {
            principals,
            tenants,
            memberships,
            audit,
            reserved_tenant,
            root_email,
            model,
        }
    }

    /// Register a new principal with the default `member` role.
    pub fn register(&self, email: &str) -> AuthResult<Principal> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::invalid_argument("invalid email format"));
        }

        let principal = Principal::new(email.clone(), Role::Member);
        if !self.principals.insert(principal.clone())? {
            return Err(AuthError::conflict(format!("email '{email}' is taken")));
        }
        Ok(principal)
    }

    /// Create a workspace. Any authenticated principal may do this; the
    /// creator becomes its owner.
    ///
    /// The configured root principal is also granted ownership here, so the
    /// "every workspace has a reachable owner" invariant is established at
    /// creation time instead of being special-cased inside resolvers.
    pub fn create_tenant(
        &self,
        actor: &Principal,
        id: TenantId,
        name: &str,
        meta: RequestMeta,
    ) -> AuthResult<Tenant> {
        let tenant = Tenant::new(id.clone(), name, actor.id);
        if !self.tenants.insert(tenant.clone())? {
            return Err(AuthError::conflict(format!("tenant '{id}' already exists")));
        }

        self.memberships
            .insert(Membership::new(actor.id, id.clone(), Role::Owner))?;
        if let Some(root_email) = &self.root_email {
            if let Some(root) = self.principals.get_by_email(root_email)? {
                if root.id != actor.id {
                    self.memberships
                        .insert(Membership::new(root.id, id.clone(), Role::Owner))?;
                }
            }
        }

        self.audit.record(
            AuditEntry::new(actions::TENANT_CREATED)
                .actor(actor.id)
                .tenant(id.clone())
                .resource("tenant", &id)
                .detail(serde_json::json!({ "name": name }))
                .request(meta),
        );
        Ok(tenant)
    }

    /// Delete a workspace and its memberships.
    ///
    /// `actor_role` is the actor's effective role *in the tenant being
    /// deleted* (`None` when not a member). The reserved tenant is denied
    /// for every role, including owner.
    pub fn delete_tenant(
        &self,
        actor: &Principal,
        actor_role: Option<Role>,
        id: &TenantId,
        meta: RequestMeta,
    ) -> AuthResult<()> {
        if *id == self.reserved_tenant {
            return Err(AuthError::Forbidden);
        }
        match actor_role {
            None => return Err(AuthError::ForbiddenTenant(id.to_string())),
            Some(Role::Owner) => {}
            Some(_) => return Err(AuthError::Forbidden),
        }
        if !self.tenants.delete(id)? {
            return Err(AuthError::NotFound);
        }
        self.memberships.delete_tenant(id)?;

        self.audit.record(
            AuditEntry::new(actions::TENANT_DELETED)
                .actor(actor.id)
                .tenant(id.clone())
                .resource("tenant", id)
                .request(meta),
        );
        Ok(())
    }

    /// Join a workspace as a `member`. Explicitly role-agnostic.
    pub fn join_tenant(
        &self,
        principal: &Principal,
        id: &TenantId,
        meta: RequestMeta,
    ) -> AuthResult<Membership> {
        if self.tenants.get(id)?.is_none() {
            return Err(AuthError::NotFound);
        }

        let membership = Membership::new(principal.id, id.clone(), Role::Member);
        if !self.memberships.insert(membership.clone())? {
            return Err(AuthError::conflict(format!(
                "already a member of tenant '{id}'"
            )));
        }

        self.audit.record(
            AuditEntry::new(actions::TENANT_JOINED)
                .actor(principal.id)
                .tenant(id.clone())
                .resource("tenant", id)
                .request(meta),
        );
        Ok(membership)
    }

    /// List workspaces. Explicitly role-agnostic (discover).
    pub fn list_tenants(&self) -> AuthResult<Vec<Tenant>> {
        Ok(self.tenants.list()?)
    }

    /// Change `target`'s role within `tenant` (or globally, under the
    /// global-role model). Runs the role mutation state machine, applies the
    /// single-row update, and appends one audit entry with before/after.
    pub fn change_role(
        &self,
        actor: &Principal,
        actor_role: Role,
        tenant: &TenantId,
        target: PrincipalId,
        new_role: Role,
        meta: RequestMeta,
    ) -> AuthResult<RoleTransition> {
        let current = match self.model {
            AuthzModel::Membership => self.memberships.role_of(target, tenant)?,
            AuthzModel::Global => self.principals.get(target)?.map(|p| p.role),
        };

        let transition = authorize_role_change(actor.id, actor_role, target, current, new_role)
            .inspect_err(|e| {
                if *e == AuthError::Forbidden {
                    self.audit.record(
                        AuditEntry::new(actions::ACCESS_DENIED)
                            .actor(actor.id)
                            .tenant(tenant.clone())
                            .resource("principal", target)
                            .detail(serde_json::json!({
                                "attempted_role": new_role,
                                "actor_role": actor_role,
                            }))
                            .request(meta.clone()),
                    );
                }
            })?;

        let applied = match self.model {
            AuthzModel::Membership => self.memberships.set_role(target, tenant, new_role)?,
            AuthzModel::Global => self.principals.set_role(target, new_role)?,
        };
        // The row can vanish between the read and the write; last write wins
        // otherwise.
        if applied.is_none() {
            return Err(AuthError::NotFound);
        }

        self.audit.record(
            AuditEntry::new(actions::ROLE_CHANGED)
                .actor(actor.id)
                .tenant(tenant.clone())
                .resource("principal", target)
                .detail(serde_json::json!({
                    "previous": transition.previous,
                    "new": transition.new,
                }))
                .request(meta),
        );
        Ok(transition)
    }

    /// Enable or disable a principal's account.
    ///
    /// `tenant` is the scope the actor is operating from; the audit entry is
    /// tagged with it so the tenant-scoped trail can retrieve the toggle.
    pub fn set_active(
        &self,
        actor: &Principal,
        actor_role: Role,
        tenant: &TenantId,
        target: PrincipalId,
        active: bool,
        meta: RequestMeta,
    ) -> AuthResult<Principal> {
        if !actor_role.is_elevated() {
            return Err(AuthError::Forbidden);
        }
        // Disabling yourself would orphan the session that could undo it.
        if actor.id == target && !active {
            return Err(AuthError::Forbidden);
        }

        let updated = self
            .principals
            .set_active(target, active)?
            .ok_or(AuthError::NotFound)?;

        let action = if active {
            actions::PRINCIPAL_ENABLED
        } else {
            actions::PRINCIPAL_DISABLED
        };
        self.audit.record(
            AuditEntry::new(action)
                .actor(actor.id)
                .tenant(tenant.clone())
                .resource("principal", target)
                .request(meta),
        );
        Ok(updated)
    }
}
