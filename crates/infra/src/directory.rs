//! Adapter exposing the stores through the narrow lookup traits the auth
//! crate defines.

use std::sync::Arc;

use tidecrm_auth::{MembershipDirectory, PrincipalDirectory};
use tidecrm_core::{AuthResult, Principal, PrincipalId, Role, TenantId};

use crate::store::{MembershipStore, PrincipalStore};

/// Read-only view over principal and membership state for the verifier and
/// the role resolver. Every call goes straight to the store: no caching, so
/// admin actions are visible to the very next request.
#[derive(Clone)]
pub struct Directory {
    principals: Arc<dyn PrincipalStore>,
    memberships: Arc<dyn MembershipStore>,
}

impl Directory {
    pub fn new(
        principals: Arc<dyn PrincipalStore>,
        memberships: Arc<dyn MembershipStore>,
    ) -> Self {
        Self {
            principals,
            memberships,
        }
    }
}

impl PrincipalDirectory for Directory {
    fn principal_by_id(&self, id: PrincipalId) -> AuthResult<Option<Principal>> {
        Ok(self.principals.get(id)?)
    }
}

impl MembershipDirectory for Directory {
    fn membership_role(
        &self,
        principal: PrincipalId,
        tenant: &TenantId,
    ) -> AuthResult<Option<Role>> {
        Ok(self.memberships.role_of(principal, tenant)?)
    }
}
