//! Audit entry and query models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tidecrm_core::{AuditEntryId, PrincipalId, TenantId};

/// Action tags for the events this subsystem emits.
pub mod actions {
    pub const TENANT_CREATED: &str = "tenant.created";
    pub const TENANT_DELETED: &str = "tenant.deleted";
    pub const TENANT_JOINED: &str = "tenant.joined";
    pub const ROLE_CHANGED: &str = "role.changed";
    pub const PRINCIPAL_ENABLED: &str = "principal.enabled";
    pub const PRINCIPAL_DISABLED: &str = "principal.disabled";
    pub const ACCESS_DENIED: &str = "access.denied";
}

/// Request metadata captured alongside an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMeta {
    pub remote_addr: Option<String>,
    pub user_agent: Option<String>,
}

/// One immutable audit entry.
///
/// Never updated or deleted by the application; the identifier and timestamp
/// are generated freshly at append time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub actor: Option<PrincipalId>,
    pub tenant: Option<TenantId>,
    pub action: String,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    /// Structured detail payload (e.g. previous/new role).
    pub detail: serde_json::Value,
    pub request: RequestMeta,
    pub at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            id: AuditEntryId::new(),
            actor: None,
            tenant: None,
            action: action.into(),
            resource_type: None,
            resource_id: None,
            detail: serde_json::Value::Null,
            request: RequestMeta::default(),
            at: Utc::now(),
        }
    }

    pub fn actor(mut self, actor: PrincipalId) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn tenant(mut self, tenant: TenantId) -> Self {
        self.tenant = Some(tenant);
        self
    }

    pub fn resource(mut self, kind: impl Into<String>, id: impl ToString) -> Self {
        self.resource_type = Some(kind.into());
        self.resource_id = Some(id.to_string());
        self
    }

    pub fn detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = detail;
        self
    }

    pub fn request(mut self, request: RequestMeta) -> Self {
        self.request = request;
        self
    }
}

/// Filter for audit queries. All criteria are conjoined; results come back
/// time-descending and limited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditQuery {
    pub actor: Option<PrincipalId>,
    pub tenant: Option<TenantId>,
    pub action: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl AuditQuery {
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(actor) = self.actor {
            if entry.actor != Some(actor) {
                return false;
            }
        }
        if let Some(tenant) = &self.tenant {
            if entry.tenant.as_ref() != Some(tenant) {
                return false;
            }
        }
        if let Some(action) = &self.action {
            if &entry.action != action {
                return false;
            }
        }
        if let Some(from) = self.from {
            if entry.at < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if entry.at > to {
                return false;
            }
        }
        true
    }
}
