//! Administrative surface: registration, identity echo, tenant lifecycle,
//! role mutation, account toggle.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use tidecrm_core::{Membership, Principal, PrincipalId, Role, Tenant, TenantId};

use crate::app::AppState;
use crate::context::{PrincipalContext, RequestMetaContext, RoleContext, TenantContext};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub email: String,
}

/// Open route: create a principal with the default `member` role. Session
/// issuance (minting a token for it) is an external collaborator's job.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<Principal>), ApiError> {
    let principal = state.admin.register(&body.email)?;
    Ok((StatusCode::CREATED, Json(principal)))
}

pub async fn whoami(
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(role): Extension<RoleContext>,
) -> Json<serde_json::Value> {
    let principal = principal.principal();
    Json(serde_json::json!({
        "principal_id": principal.id,
        "email": principal.email,
        "tenant": tenant.tenant_id(),
        "role": role.role(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct CreateTenantBody {
    pub id: String,
    pub name: String,
}

pub async fn create_tenant(
    State(state): State<AppState>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(meta): Extension<RequestMetaContext>,
    Json(body): Json<CreateTenantBody>,
) -> Result<(StatusCode, Json<Tenant>), ApiError> {
    let id = TenantId::new(body.id)?;
    let tenant = state
        .admin
        .create_tenant(principal.principal(), id, &body.name, meta.0)?;
    Ok((StatusCode::CREATED, Json(tenant)))
}

/// Discover workspaces. Explicitly role-agnostic.
pub async fn list_tenants(
    State(state): State<AppState>,
) -> Result<Json<Vec<Tenant>>, ApiError> {
    Ok(Json(state.admin.list_tenants()?))
}

/// Delete a workspace. Authorization is evaluated against the *target*
/// tenant, not the request's resolved tenant context.
pub async fn delete_tenant(
    State(state): State<AppState>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(meta): Extension<RequestMetaContext>,
    Path(id): Path<TenantId>,
) -> Result<StatusCode, ApiError> {
    let actor = principal.principal();
    let actor_role = state.roles.effective_role(actor, &id)?;
    state.admin.delete_tenant(actor, actor_role, &id, meta.0)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Join a workspace as `member`. Explicitly role-agnostic.
pub async fn join_tenant(
    State(state): State<AppState>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(meta): Extension<RequestMetaContext>,
    Path(id): Path<TenantId>,
) -> Result<(StatusCode, Json<Membership>), ApiError> {
    let membership = state
        .admin
        .join_tenant(principal.principal(), &id, meta.0)?;
    Ok((StatusCode::CREATED, Json(membership)))
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleBody {
    pub role: Role,
}

pub async fn change_role(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(role): Extension<RoleContext>,
    Extension(meta): Extension<RequestMetaContext>,
    Path(target): Path<PrincipalId>,
    Json(body): Json<ChangeRoleBody>,
) -> Result<Json<tidecrm_auth::RoleTransition>, ApiError> {
    let actor_role = role.require(&tenant)?;
    let transition = state.admin.change_role(
        principal.principal(),
        actor_role,
        tenant.tenant_id(),
        target,
        body.role,
        meta.0,
    )?;
    Ok(Json(transition))
}

#[derive(Debug, Deserialize)]
pub struct SetActiveBody {
    pub active: bool,
}

pub async fn set_active(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(role): Extension<RoleContext>,
    Extension(meta): Extension<RequestMetaContext>,
    Path(target): Path<PrincipalId>,
    Json(body): Json<SetActiveBody>,
) -> Result<Json<Principal>, ApiError> {
    let actor_role = role.require(&tenant)?;
    let updated = state.admin.set_active(
        principal.principal(),
        actor_role,
        tenant.tenant_id(),
        target,
        body.active,
        meta.0,
    )?;
    Ok(Json(updated))
}
