//! Record CRUD routes.
//!
//! Exemplar resource handlers: tenant and role come pre-resolved from the
//! middleware, the access decision engine runs inside the record service
//! before any data is touched, and list queries carry the ownership filter.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use tidecrm_core::{RecordId, RecordKind, ResourceRecord};

use crate::app::AppState;
use crate::context::{PrincipalContext, RequestMetaContext, RoleContext, TenantContext};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
}

pub async fn create(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(role): Extension<RoleContext>,
    Path(kind): Path<String>,
    Json(fields): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<ResourceRecord>), ApiError> {
    let kind: RecordKind = kind.parse()?;
    let role = role.require(&tenant)?;

    let record = state.records.create(
        principal.principal(),
        role,
        tenant.tenant_id(),
        kind,
        fields,
    )?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(role): Extension<RoleContext>,
    Path(kind): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ResourceRecord>>, ApiError> {
    let kind: RecordKind = kind.parse()?;
    let role = role.require(&tenant)?;

    let records = state.records.list(
        principal.principal(),
        role,
        tenant.tenant_id(),
        kind,
        params.limit,
    )?;
    Ok(Json(records))
}

pub async fn fetch(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(role): Extension<RoleContext>,
    Extension(meta): Extension<RequestMetaContext>,
    Path((kind, id)): Path<(String, RecordId)>,
) -> Result<Json<ResourceRecord>, ApiError> {
    let kind: RecordKind = kind.parse()?;
    let role = role.require(&tenant)?;

    let record = state.records.get(
        principal.principal(),
        role,
        tenant.tenant_id(),
        kind,
        id,
        &meta.0,
    )?;
    Ok(Json(record))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(role): Extension<RoleContext>,
    Extension(meta): Extension<RequestMetaContext>,
    Path((kind, id)): Path<(String, RecordId)>,
    Json(fields): Json<serde_json::Value>,
) -> Result<Json<ResourceRecord>, ApiError> {
    let kind: RecordKind = kind.parse()?;
    let role = role.require(&tenant)?;

    let record = state.records.update(
        principal.principal(),
        role,
        tenant.tenant_id(),
        kind,
        id,
        fields,
        &meta.0,
    )?;
    Ok(Json(record))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(role): Extension<RoleContext>,
    Extension(meta): Extension<RequestMetaContext>,
    Path((kind, id)): Path<(String, RecordId)>,
) -> Result<StatusCode, ApiError> {
    let kind: RecordKind = kind.parse()?;
    let role = role.require(&tenant)?;

    state.records.delete(
        principal.principal(),
        role,
        tenant.tenant_id(),
        kind,
        id,
        &meta.0,
    )?;
    Ok(StatusCode::NO_CONTENT)
}
