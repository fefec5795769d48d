use std::sync::Arc;

use chrono::Duration as ChronoDuration;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use tidecrm_api::{build_state, router, AppConfig, Stores};
use tidecrm_auth::AccessClaims;
use tidecrm_core::{Membership, Principal, PrincipalId, Role, TenantId};
use tidecrm_infra::{MembershipStore, PrincipalStore, StoreError};

const JWT_SECRET: &str = "test-secret";

fn demo() -> TenantId {
    "demo".parse().expect("valid tenant id")
}

struct TestServer {
    base_url: String,
    principals: Arc<dyn PrincipalStore>,
    memberships: Arc<dyn MembershipStore>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(Stores::in_memory()).await
    }

    // Same router as prod, bound to an ephemeral port. Store handles are
    // retained so tests can seed principals and memberships directly.
    async fn spawn_with(stores: Stores) -> Self {
        let principals = stores.principals.clone();
        let memberships = stores.memberships.clone();

        let config = AppConfig::for_tests(JWT_SECRET, demo());
        let app = router(build_state(&config, stores));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            principals,
            memberships,
            handle,
        }
    }

    /// Seed a principal holding `role` in the default tenant and return it
    /// together with a freshly minted token.
    fn seed(&self, email: &str, role: Role) -> (Principal, String) {
        let principal = Principal::new(email, Role::Member);
        self.principals.insert(principal.clone()).unwrap();
        self.memberships
            .insert(Membership::new(principal.id, demo(), role))
            .unwrap();
        let token = mint_jwt(principal.id);
        (principal, token)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(sub: PrincipalId) -> String {
    let claims = AccessClaims::new(sub, ChronoDuration::minutes(10));
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

struct UnavailablePrincipalStore;

impl UnavailablePrincipalStore {
    fn outage() -> StoreError {
        StoreError::Unavailable("simulated outage".to_string())
    }
}

impl PrincipalStore for UnavailablePrincipalStore {
    fn get(&self, _id: PrincipalId) -> Result<Option<Principal>, StoreError> {
        Err(Self::outage())
    }

    fn get_by_email(&self, _email: &str) -> Result<Option<Principal>, StoreError> {
        Err(Self::outage())
    }

    fn insert(&self, _principal: Principal) -> Result<bool, StoreError> {
        Err(Self::outage())
    }

    fn set_active(
        &self,
        _id: PrincipalId,
        _active: bool,
    ) -> Result<Option<Principal>, StoreError> {
        Err(Self::outage())
    }

    fn set_role(&self, _id: PrincipalId, _role: Role) -> Result<Option<Role>, StoreError> {
        Err(Self::outage())
    }
}

#[tokio::test]
async fn health_is_open() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // A garbage token is indistinguishable from a missing one.
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Token for a principal the directory has never seen.
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(mint_jwt(PrincipalId::new()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn principal_store_outage_is_a_server_fault_not_a_credential_failure() {
    let mut stores = Stores::in_memory();
    stores.principals = Arc::new(UnavailablePrincipalStore);
    let srv = TestServer::spawn_with(stores).await;

    // A well-formed token against a dead principal store must surface as a
    // 500, never as the undifferentiated 401.
    let res = reqwest::Client::new()
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(mint_jwt(PrincipalId::new()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn whoami_reflects_stored_identity_and_tenant() {
    let srv = TestServer::spawn().await;
    let (alice, token) = srv.seed("alice@example.com", Role::Member);

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["principal_id"].as_str().unwrap(), alice.id.to_string());
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["tenant"], "demo");
    assert_eq!(body["role"], "member");
}

#[tokio::test]
async fn disabled_principal_is_locked_out_until_reenabled() {
    let srv = TestServer::spawn().await;
    let (mallory, mallory_token) = srv.seed("mallory@example.com", Role::Member);
    let (_, admin_token) = srv.seed("admin@example.com", Role::Admin);

    let client = reqwest::Client::new();
    let whoami = |token: String| {
        let client = client.clone();
        let url = format!("{}/whoami", srv.base_url);
        async move { client.get(url).bearer_auth(token).send().await.unwrap() }
    };

    assert_eq!(whoami(mallory_token.clone()).await.status(), StatusCode::OK);

    // Disable. The still-valid token must stop working on the next request.
    let res = client
        .put(format!("{}/principals/{}/active", srv.base_url, mallory.id))
        .bearer_auth(&admin_token)
        .json(&json!({ "active": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        whoami(mallory_token.clone()).await.status(),
        StatusCode::UNAUTHORIZED
    );

    // Re-enable restores access without reissuing the token.
    let res = client
        .put(format!("{}/principals/{}/active", srv.base_url, mallory.id))
        .bearer_auth(&admin_token)
        .json(&json!({ "active": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(whoami(mallory_token).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn ownership_walls_fall_on_promotion() {
    let srv = TestServer::spawn().await;
    let (_, a_token) = srv.seed("a@example.com", Role::Member);
    let (b, b_token) = srv.seed("b@example.com", Role::Member);
    let (c, c_token) = srv.seed("c@example.com", Role::Admin);

    let client = reqwest::Client::new();

    // Member A creates a lead.
    let res = client
        .post(format!("{}/records/leads", srv.base_url))
        .bearer_auth(&a_token)
        .json(&json!({ "name": "L1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let lead: serde_json::Value = res.json().await.unwrap();
    let lead_id = lead["id"].as_str().unwrap().to_string();

    let lead_url = format!("{}/records/leads/{}", srv.base_url, lead_id);

    // Member B cannot read A's lead.
    let res = client
        .get(&lead_url)
        .bearer_auth(&b_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Admin C can.
    let res = client
        .get(&lead_url)
        .bearer_auth(&c_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // C promotes B to admin.
    let res = client
        .put(format!("{}/principals/{}/role", srv.base_url, b.id))
        .bearer_auth(&c_token)
        .json(&json!({ "role": "admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let transition: serde_json::Value = res.json().await.unwrap();
    assert_eq!(transition["previous"], "member");
    assert_eq!(transition["new"], "admin");

    // The promotion takes effect on B's very next request.
    let res = client
        .get(&lead_url)
        .bearer_auth(&b_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // B, now admin, still cannot mint an owner.
    let res = client
        .put(format!("{}/principals/{}/role", srv.base_url, c.id))
        .bearer_auth(&b_token)
        .json(&json!({ "role": "owner" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn member_listings_are_scoped_to_owned_records() {
    let srv = TestServer::spawn().await;
    let (_, a_token) = srv.seed("a@example.com", Role::Member);
    let (_, b_token) = srv.seed("b@example.com", Role::Member);
    let (_, admin_token) = srv.seed("admin@example.com", Role::Admin);

    let client = reqwest::Client::new();
    for (token, name) in [(&a_token, "A1"), (&a_token, "A2"), (&b_token, "B1")] {
        let res = client
            .post(format!("{}/records/contacts", srv.base_url))
            .bearer_auth(token)
            .json(&json!({ "name": name }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let list = |token: String| {
        let client = client.clone();
        let url = format!("{}/records/contacts", srv.base_url);
        async move {
            let res = client.get(url).bearer_auth(token).send().await.unwrap();
            assert_eq!(res.status(), StatusCode::OK);
            res.json::<Vec<serde_json::Value>>().await.unwrap()
        }
    };

    let a_view = list(a_token).await;
    assert_eq!(a_view.len(), 2);
    assert!(a_view.iter().all(|r| r["fields"]["name"].as_str().unwrap().starts_with('A')));

    assert_eq!(list(b_token).await.len(), 1);
    assert_eq!(list(admin_token).await.len(), 3);
}

#[tokio::test]
async fn reserved_tenant_cannot_be_deleted() {
    let srv = TestServer::spawn().await;
    let (_, owner_token) = srv.seed("owner@example.com", Role::Owner);

    let client = reqwest::Client::new();
    let res = client
        .delete(format!("{}/tenants/demo", srv.base_url))
        .bearer_auth(&owner_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn tenant_lifecycle_and_cross_tenant_isolation() {
    let srv = TestServer::spawn().await;
    let (_, a_token) = srv.seed("a@example.com", Role::Member);
    let (_, b_token) = srv.seed("b@example.com", Role::Member);

    let client = reqwest::Client::new();

    // Any authenticated principal may create a workspace; creator becomes owner.
    let res = client
        .post(format!("{}/tenants", srv.base_url))
        .bearer_auth(&a_token)
        .json(&json!({ "id": "acme", "name": "Acme Corp" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // Duplicate identifier.
    let res = client
        .post(format!("{}/tenants", srv.base_url))
        .bearer_auth(&a_token)
        .json(&json!({ "id": "acme", "name": "Acme again" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Identifier outside the slug charset.
    let res = client
        .post(format!("{}/tenants", srv.base_url))
        .bearer_auth(&a_token)
        .json(&json!({ "id": "bad id!", "name": "Nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // A record created in demo is invisible from acme even for acme's owner.
    let res = client
        .post(format!("{}/records/leads", srv.base_url))
        .bearer_auth(&a_token)
        .json(&json!({ "name": "demo-only" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let lead: serde_json::Value = res.json().await.unwrap();
    let lead_id = lead["id"].as_str().unwrap();

    let res = client
        .get(format!("{}/records/leads/{}", srv.base_url, lead_id))
        .bearer_auth(&a_token)
        .header("x-tenant", "acme")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // B holds no membership in acme and cannot act there at all.
    let res = client
        .get(format!("{}/records/leads", srv.base_url))
        .bearer_auth(&b_token)
        .header("x-tenant", "acme")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Joining grants member access on the next request.
    let res = client
        .post(format!("{}/tenants/acme/join", srv.base_url))
        .bearer_auth(&b_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .get(format!("{}/records/leads", srv.base_url))
        .bearer_auth(&b_token)
        .header("x-tenant", "acme")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn audit_trail_requires_elevation_and_scopes_to_tenant() {
    let srv = TestServer::spawn().await;
    let (_, a_token) = srv.seed("a@example.com", Role::Member);
    let (_, member_token) = srv.seed("m@example.com", Role::Member);

    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/tenants", srv.base_url))
        .bearer_auth(&a_token)
        .json(&json!({ "id": "orbit", "name": "Orbit" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // A owns orbit, so the orbit-scoped trail is visible to them.
    let res = client
        .get(format!("{}/audit", srv.base_url))
        .bearer_auth(&a_token)
        .header("x-tenant", "orbit")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let entries: Vec<serde_json::Value> = res.json().await.unwrap();
    assert!(entries.iter().any(|e| e["action"] == "tenant.created"));
    assert!(entries.iter().all(|e| e["tenant"] == "orbit"));

    // Plain members get nothing from the trail.
    let res = client
        .get(format!("{}/audit", srv.base_url))
        .bearer_auth(&member_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}
