//! Business records (leads, contacts, deals, accounts).
//!
//! The record model here is deliberately thin: domain fields are opaque JSON.
//! What the authorization engine cares about is the owning tenant and the
//! creating principal, both immutable after creation.

use core::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AuthError, PrincipalId, RecordId, TenantId};

/// The resource tables served by the record endpoints.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Lead,
    Contact,
    Deal,
    Account,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Lead,
        RecordKind::Contact,
        RecordKind::Deal,
        RecordKind::Account,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Lead => "lead",
            RecordKind::Contact => "contact",
            RecordKind::Deal => "deal",
            RecordKind::Account => "account",
        }
    }
}

impl core::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lead" | "leads" => Ok(RecordKind::Lead),
            "contact" | "contacts" => Ok(RecordKind::Contact),
            "deal" | "deals" => Ok(RecordKind::Deal),
            "account" | "accounts" => Ok(RecordKind::Account),
            other => Err(AuthError::invalid_argument(format!(
                "unknown record kind '{other}'"
            ))),
        }
    }
}

/// A business record.
///
/// # Invariants
/// - Belongs to exactly one tenant; `tenant_id` is immutable after creation.
/// - `created_by` identifies the owning principal and is immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub id: RecordId,
    pub kind: RecordKind,
    pub tenant_id: TenantId,
    pub created_by: PrincipalId,
    /// Domain fields (name, stage, amount, ...), opaque to authorization.
    pub fields: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResourceRecord {
    pub fn new(
        kind: RecordKind,
        tenant_id: TenantId,
        created_by: PrincipalId,
        fields: serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            kind,
            tenant_id,
            created_by,
            fields,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the domain fields, leaving tenant and creator untouched.
    pub fn update_fields(&mut self, fields: serde_json::Value) {
        self.fields = fields;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_kind_parses_singular_and_plural() {
        assert_eq!("lead".parse::<RecordKind>().unwrap(), RecordKind::Lead);
        assert_eq!("deals".parse::<RecordKind>().unwrap(), RecordKind::Deal);
        assert!("invoice".parse::<RecordKind>().is_err());
    }

    #[test]
    fn update_fields_keeps_ownership() {
        let tenant = TenantId::new("demo").unwrap();
        let creator = PrincipalId::new();
        let mut record = ResourceRecord::new(
            RecordKind::Lead,
            tenant.clone(),
            creator,
            serde_json::json!({"name": "Acme"}),
        );

        record.update_fields(serde_json::json!({"name": "Acme Corp"}));

        assert_eq!(record.tenant_id, tenant);
        assert_eq!(record.created_by, creator);
        assert_eq!(record.fields["name"], "Acme Corp");
    }
}
