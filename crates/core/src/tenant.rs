//! Tenant (workspace): an isolated namespace of business records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PrincipalId, TenantId};

/// A tenant is an isolated workspace. It is never implicitly created.
///
/// `created_by` is set once at creation and is informational: it does not by
/// itself grant any authority over the tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub created_by: PrincipalId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    pub fn new(id: TenantId, name: impl Into<String>, created_by: PrincipalId) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            created_by,
            created_at: now,
            updated_at: now,
        }
    }
}
