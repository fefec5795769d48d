//! Membership: the (principal, tenant, role) relation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PrincipalId, Role, TenantId};

/// A principal's membership in a tenant, unique per (principal, tenant).
///
/// Created on tenant creation or join, mutated only by role-change
/// operations, deleted when the tenant is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub principal_id: PrincipalId,
    pub tenant_id: TenantId,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(principal_id: PrincipalId, tenant_id: TenantId, role: Role) -> Self {
        let now = Utc::now();
        Self {
            principal_id,
            tenant_id,
            role,
            created_at: now,
            updated_at: now,
        }
    }
}
