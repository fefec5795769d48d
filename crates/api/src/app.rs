//! Application wiring: stores, services, router.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;

use tidecrm_audit::{AuditRecorder, AuditStore, InMemoryAuditStore};
use tidecrm_auth::{
    AuthzModel, CredentialVerifier, GlobalRoleResolver, MembershipRoleResolver, RoleResolver,
    TenantResolver,
};
use tidecrm_core::{Membership, Principal, Role, Tenant};
use tidecrm_infra::{
    AdminService, Directory, InMemoryMembershipStore, InMemoryPrincipalStore, InMemoryRecordStore,
    InMemoryTenantStore, MembershipStore, PrincipalStore, RecordService, RecordStore, TenantStore,
};

use crate::config::AppConfig;
use crate::middleware::auth_middleware;
use crate::routes;

/// Storage collaborators behind their contracts. Swappable wholesale: the
/// router only ever sees the traits.
#[derive(Clone)]
pub struct Stores {
    pub principals: Arc<dyn PrincipalStore>,
    pub tenants: Arc<dyn TenantStore>,
    pub memberships: Arc<dyn MembershipStore>,
    pub records: Arc<dyn RecordStore>,
    pub audit: Arc<dyn AuditStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            principals: Arc::new(InMemoryPrincipalStore::new()),
            tenants: Arc::new(InMemoryTenantStore::new()),
            memberships: Arc::new(InMemoryMembershipStore::new()),
            records: Arc::new(InMemoryRecordStore::new()),
            audit: Arc::new(InMemoryAuditStore::new()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<CredentialVerifier<Directory>>,
    pub tenants: TenantResolver,
    pub roles: Arc<dyn RoleResolver>,
    pub admin: Arc<AdminService>,
    pub records: Arc<RecordService>,
    pub audit: AuditRecorder<Arc<dyn AuditStore>>,
}

/// Build the application state, seeding the reserved tenant if absent.
pub fn build_state(config: &AppConfig, stores: Stores) -> AppState {
    seed_reserved_tenant(config, &stores);

    let directory = Directory::new(stores.principals.clone(), stores.memberships.clone());

    let mut verifier = CredentialVerifier::new(config.jwt_secret.clone(), directory.clone());
    if let Some(principal) = config.dev_principal() {
        verifier = verifier.with_dev_bypass(principal);
    }

    let roles: Arc<dyn RoleResolver> = match config.authz_model {
        AuthzModel::Global => Arc::new(GlobalRoleResolver),
        AuthzModel::Membership => Arc::new(MembershipRoleResolver::new(directory)),
    };

    let audit = AuditRecorder::new(stores.audit.clone());

    AppState {
        verifier: Arc::new(verifier),
        tenants: TenantResolver::new(config.default_tenant.clone()),
        roles,
        admin: Arc::new(AdminService::new(
            stores.principals.clone(),
            stores.tenants.clone(),
            stores.memberships.clone(),
            audit.clone(),
            config.default_tenant.clone(),
            config.root_email.clone(),
            config.authz_model,
        )),
        records: Arc::new(RecordService::new(stores.records, audit.clone())),
        audit,
    }
}

/// The reserved tenant must exist and keep at least one owner. Seeded under
/// a system principal so a fresh deployment is usable immediately.
fn seed_reserved_tenant(config: &AppConfig, stores: &Stores) {
    let seeded = stores
        .tenants
        .get(&config.default_tenant)
        .map(|t| t.is_some())
        .unwrap_or(false);
    if seeded {
        return;
    }

    let system = Principal::new("system@tidecrm.local", Role::Owner);
    let tenant = Tenant::new(config.default_tenant.clone(), "Demo workspace", system.id);
    let membership = Membership::new(system.id, config.default_tenant.clone(), Role::Owner);

    if stores.principals.insert(system).is_err()
        || stores.tenants.insert(tenant).is_err()
        || stores.memberships.insert(membership).is_err()
    {
        tracing::error!(tenant = %config.default_tenant, "failed to seed reserved tenant");
    }
}

/// Routing tree: health and registration are open, everything else sits
/// behind the authentication middleware.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/whoami", get(routes::admin::whoami))
        .route(
            "/records/:kind",
            get(routes::records::list).post(routes::records::create),
        )
        .route(
            "/records/:kind/:id",
            get(routes::records::fetch)
                .put(routes::records::update)
                .delete(routes::records::remove),
        )
        .route(
            "/tenants",
            get(routes::admin::list_tenants).post(routes::admin::create_tenant),
        )
        .route("/tenants/:id", delete(routes::admin::delete_tenant))
        .route("/tenants/:id/join", post(routes::admin::join_tenant))
        .route("/principals/:id/role", put(routes::admin::change_role))
        .route("/principals/:id/active", put(routes::admin::set_active))
        .route("/audit", get(routes::audit::query))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/register", post(routes::admin::register))
        .merge(protected)
        .layer(ServiceBuilder::new())
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// Production wiring: in-memory collaborators until a relational store is
/// plugged in behind [`Stores`].
pub fn build_app(config: AppConfig) -> Router {
    let state = build_state(&config, Stores::in_memory());
    router(state)
}
