//! Tenant Resolver: which workspace does this request apply to?

use tidecrm_core::TenantId;

/// Resolves the *requested* tenant for a request.
///
/// Precedence: explicit per-request override, then the hint negotiated into
/// the credential, then the configured default. There is no failure mode and
/// no existence check here; verifying that the tenant exists is the job of
/// whichever handler touches it, to avoid duplicate lookups.
#[derive(Debug, Clone)]
pub struct TenantResolver {
    default: TenantId,
}

impl TenantResolver {
    pub fn new(default: TenantId) -> Self {
        Self { default }
    }

    pub fn default_tenant(&self) -> &TenantId {
        &self.default
    }

    pub fn resolve(&self, explicit: Option<TenantId>, hint: Option<TenantId>) -> TenantId {
        explicit.or(hint).unwrap_or_else(|| self.default.clone())
    }
}
