//! Authentication middleware: Credential Verifier → Tenant Resolver → Role
//! Resolver, in that order, before any handler runs.

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use tidecrm_audit::RequestMeta;
use tidecrm_core::{AuthError, TenantId};

use crate::app::AppState;
use crate::context::{PrincipalContext, RequestMetaContext, RoleContext, TenantContext};
use crate::error::ApiError;

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = extract_bearer(req.headers())?.map(str::to_owned);

    // The verifier distinguishes token failures from disabled accounts for
    // audit purposes; callers get one undifferentiated 401 for the whole
    // credential-verification class. A failing principal lookup is a server
    // fault, not a credential failure, and keeps its own status.
    let identity = state.verifier.verify(bearer.as_deref()).map_err(|e| match e {
        AuthError::Unauthorized | AuthError::Forbidden => ApiError::authentication(),
        other => ApiError::Auth(other),
    })?;

    let explicit = explicit_tenant(req.headers())?;
    let tenant = state.tenants.resolve(explicit, identity.tenant_hint.clone());

    let role = state.roles.effective_role(&identity.principal, &tenant)?;

    let meta = RequestMeta {
        remote_addr: header_string(req.headers(), "x-forwarded-for"),
        user_agent: header_string(req.headers(), axum::http::header::USER_AGENT.as_str()),
    };

    req.extensions_mut().insert(TenantContext::new(tenant));
    req.extensions_mut()
        .insert(PrincipalContext::new(identity.principal));
    req.extensions_mut().insert(RoleContext::new(role));
    req.extensions_mut().insert(RequestMetaContext(meta));

    Ok(next.run(req).await)
}

/// Bearer token, if an Authorization header is present.
///
/// A malformed header is an authentication failure, not "no credential":
/// only full absence may fall through to the development bypass.
fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| ApiError::authentication())?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(ApiError::authentication)?
        .trim();
    if token.is_empty() {
        return Err(ApiError::authentication());
    }
    Ok(Some(token))
}

/// Explicit per-request tenant override (`X-Tenant` header).
fn explicit_tenant(headers: &HeaderMap) -> Result<Option<TenantId>, ApiError> {
    match header_string(headers, "x-tenant") {
        None => Ok(None),
        Some(raw) => Ok(Some(raw.parse::<TenantId>()?)),
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}
