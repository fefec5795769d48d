//! Principal: an authenticated actor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PrincipalId, Role};

/// An authenticated actor (human user or service identity).
///
/// # Invariants
/// - Exactly one global role at a time.
/// - Principals are disabled, never deleted, to revoke access: the stored
///   `active` flag is re-read on every request and overrides any token claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub email: String,
    /// Global role, used directly by the global-role authorization model and
    /// for cross-tenant administrative visibility.
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Principal {
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: PrincipalId::new(),
            email: email.into().trim().to_lowercase(),
            role,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
