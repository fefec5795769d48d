//! Audit trail queries, scoped to the request's tenant.

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use tidecrm_audit::{AuditEntry, AuditQuery};
use tidecrm_core::{AuthError, PrincipalId};

use crate::app::AppState;
use crate::context::{RoleContext, TenantContext};
use crate::error::ApiError;

const DEFAULT_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct AuditParams {
    pub actor: Option<PrincipalId>,
    pub action: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

pub async fn query(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Extension(role): Extension<RoleContext>,
    Query(params): Query<AuditParams>,
) -> Result<Json<Vec<AuditEntry>>, ApiError> {
    let role = role.require(&tenant)?;
    if !role.is_elevated() {
        return Err(AuthError::Forbidden.into());
    }

    let entries = state
        .audit
        .query(&AuditQuery {
            actor: params.actor,
            tenant: Some(tenant.tenant_id().clone()),
            action: params.action,
            from: params.from,
            to: params.to,
            limit: Some(params.limit.unwrap_or(DEFAULT_LIMIT)),
        })
        .map_err(|e| AuthError::internal(e.to_string()))?;
    Ok(Json(entries))
}
