//! Bearer token claims model (transport-agnostic).

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use tidecrm_core::{PrincipalId, Role, TenantId};

/// Claims carried by an access token.
///
/// This is the minimal set the engine expects once a token has been decoded
/// and its signature verified. Note that the role claim and the tenant hint
/// are *hints*: the active flag and the effective role are always re-derived
/// from stored state per request, since claims can be stale relative to admin
/// action taken after issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject / principal identifier.
    pub sub: PrincipalId,

    /// Email of the subject at issuance time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Previously negotiated active tenant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<TenantId>,

    /// Role at issuance time. Never used for authorization decisions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Issued-at (Unix timestamp).
    pub iat: i64,

    /// Expiration (Unix timestamp).
    pub exp: i64,
}

impl AccessClaims {
    /// Claims for a principal with the given time to live, no tenant hint.
    ///
    /// Token *minting* belongs to an external session issuer; this
    /// constructor exists for tests and local tooling.
    pub fn new(sub: PrincipalId, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub,
            email: None,
            tenant: None,
            role: None,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    pub fn with_tenant(mut self, tenant: TenantId) -> Self {
        self.tenant = Some(tenant);
        self
    }
}
