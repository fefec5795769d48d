//! Record handlers' storage side: CRUD gated by the access decision engine.
//!
//! Every operation receives the already-resolved (principal, tenant,
//! effective role) triple and consults the decision functions against the
//! *stored* record before touching data. Security-relevant denials are
//! audited; plain not-found misses are not.

use std::sync::Arc;

use tidecrm_audit::{actions, AuditEntry, AuditRecorder, AuditStore, RequestMeta};
use tidecrm_auth::{can_create, can_delete, can_read, can_update, OwnershipFilter};
use tidecrm_core::{
    AuthError, AuthResult, Principal, RecordId, RecordKind, ResourceRecord, Role, TenantId,
};

use crate::store::RecordStore;

pub struct RecordService {
    records: Arc<dyn RecordStore>,
    audit: AuditRecorder<Arc<dyn AuditStore>>,
}

impl RecordService {
    pub fn new(records: Arc<dyn RecordStore>, audit: AuditRecorder<Arc<dyn AuditStore>>) -> Self {
        Self { records, audit }
    }

    fn audit_denial(
        &self,
        actor: &Principal,
        tenant: &TenantId,
        kind: RecordKind,
        id: RecordId,
        operation: &str,
        meta: &RequestMeta,
    ) {
        self.audit.record(
            AuditEntry::new(actions::ACCESS_DENIED)
                .actor(actor.id)
                .tenant(tenant.clone())
                .resource(kind.as_str(), id)
                .detail(serde_json::json!({ "operation": operation }))
                .request(meta.clone()),
        );
    }

    /// Ownership check against the stored record, auditing `Forbidden`
    /// denials (an existing record someone tried to touch), not misses.
    fn guard(
        &self,
        check: fn(Role, tidecrm_core::PrincipalId, Option<tidecrm_core::PrincipalId>) -> AuthResult<()>,
        operation: &str,
        actor: &Principal,
        role: Role,
        tenant: &TenantId,
        kind: RecordKind,
        id: RecordId,
        existing: Option<&ResourceRecord>,
        meta: &RequestMeta,
    ) -> AuthResult<()> {
        check(role, actor.id, existing.map(|r| r.created_by)).inspect_err(|e| {
            if *e == AuthError::Forbidden {
                self.audit_denial(actor, tenant, kind, id, operation, meta);
            }
        })
    }

    pub fn create(
        &self,
        actor: &Principal,
        role: Role,
        tenant: &TenantId,
        kind: RecordKind,
        fields: serde_json::Value,
    ) -> AuthResult<ResourceRecord> {
        can_create(role)?;
        let record = ResourceRecord::new(kind, tenant.clone(), actor.id, fields);
        self.records.insert(record.clone())?;
        Ok(record)
    }

    pub fn get(
        &self,
        actor: &Principal,
        role: Role,
        tenant: &TenantId,
        kind: RecordKind,
        id: RecordId,
        meta: &RequestMeta,
    ) -> AuthResult<ResourceRecord> {
        let existing = self.records.get(tenant, kind, id)?;
        self.guard(can_read, "read", actor, role, tenant, kind, id, existing.as_ref(), meta)?;
        existing.ok_or(AuthError::NotFound)
    }

    pub fn update(
        &self,
        actor: &Principal,
        role: Role,
        tenant: &TenantId,
        kind: RecordKind,
        id: RecordId,
        fields: serde_json::Value,
        meta: &RequestMeta,
    ) -> AuthResult<ResourceRecord> {
        let existing = self.records.get(tenant, kind, id)?;
        self.guard(can_update, "update", actor, role, tenant, kind, id, existing.as_ref(), meta)?;

        let mut record = existing.ok_or(AuthError::NotFound)?;
        record.update_fields(fields);
        self.records.update(record.clone())?;
        Ok(record)
    }

    pub fn delete(
        &self,
        actor: &Principal,
        role: Role,
        tenant: &TenantId,
        kind: RecordKind,
        id: RecordId,
        meta: &RequestMeta,
    ) -> AuthResult<()> {
        let existing = self.records.get(tenant, kind, id)?;
        self.guard(can_delete, "delete", actor, role, tenant, kind, id, existing.as_ref(), meta)?;

        if !self.records.delete(tenant, kind, id)? {
            return Err(AuthError::NotFound);
        }
        Ok(())
    }

    /// List with the role's ownership filter conjoined at the query layer.
    pub fn list(
        &self,
        actor: &Principal,
        role: Role,
        tenant: &TenantId,
        kind: RecordKind,
        limit: Option<usize>,
    ) -> AuthResult<Vec<ResourceRecord>> {
        let filter = OwnershipFilter::for_role(role, actor.id);
        Ok(self.records.list(tenant, kind, &filter, limit)?)
    }
}

#[cfg(test)]
mod tests {
    use tidecrm_audit::{AuditQuery, InMemoryAuditStore};

    use crate::memory::InMemoryRecordStore;

    use super::*;

    struct Harness {
        service: RecordService,
        audit: Arc<InMemoryAuditStore>,
    }

    fn harness() -> Harness {
        let audit = Arc::new(InMemoryAuditStore::new());
        Harness {
            service: RecordService::new(
                Arc::new(InMemoryRecordStore::new()),
                AuditRecorder::new(audit.clone() as Arc<dyn AuditStore>),
            ),
            audit,
        }
    }

    fn tenant(s: &str) -> TenantId {
        s.parse().unwrap()
    }

    fn principal(email: &str) -> Principal {
        Principal::new(email, Role::Member)
    }

    #[test]
    fn member_sees_only_their_own_records() {
        let h = harness();
        let acme = tenant("acme");
        let alice = principal("alice@example.com");
        let bob = principal("bob@example.com");
        let meta = RequestMeta::default();

        let lead = h
            .service
            .create(&alice, Role::Member, &acme, RecordKind::Lead, serde_json::json!({"name": "L1"}))
            .unwrap();

        // Owner reads fine.
        assert!(h
            .service
            .get(&alice, Role::Member, &acme, RecordKind::Lead, lead.id, &meta)
            .is_ok());

        // Another member is refused, and the attempt is audited.
        assert_eq!(
            h.service
                .get(&bob, Role::Member, &acme, RecordKind::Lead, lead.id, &meta)
                .unwrap_err(),
            AuthError::Forbidden
        );
        let denials = h
            .audit
            .query(&AuditQuery {
                action: Some(actions::ACCESS_DENIED.to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(denials.len(), 1);
        assert_eq!(denials[0].actor, Some(bob.id));

        // An admin bypasses ownership.
        assert!(h
            .service
            .get(&bob, Role::Admin, &acme, RecordKind::Lead, lead.id, &meta)
            .is_ok());
    }

    #[test]
    fn absent_record_is_not_found_not_forbidden() {
        let h = harness();
        let acme = tenant("acme");
        let alice = principal("alice@example.com");
        let meta = RequestMeta::default();

        for role in [Role::Member, Role::Admin, Role::Owner] {
            assert_eq!(
                h.service
                    .get(&alice, role, &acme, RecordKind::Deal, RecordId::new(), &meta)
                    .unwrap_err(),
                AuthError::NotFound
            );
        }
        // Misses are not audited as denials.
        assert!(h.audit.is_empty());
    }

    #[test]
    fn update_checks_the_existing_record_not_the_payload() {
        let h = harness();
        let acme = tenant("acme");
        let alice = principal("alice@example.com");
        let bob = principal("bob@example.com");
        let meta = RequestMeta::default();

        let lead = h
            .service
            .create(&alice, Role::Member, &acme, RecordKind::Lead, serde_json::json!({}))
            .unwrap();

        assert_eq!(
            h.service
                .update(
                    &bob,
                    Role::Member,
                    &acme,
                    RecordKind::Lead,
                    lead.id,
                    serde_json::json!({"created_by": bob.id}),
                    &meta,
                )
                .unwrap_err(),
            AuthError::Forbidden
        );

        let updated = h
            .service
            .update(
                &alice,
                Role::Member,
                &acme,
                RecordKind::Lead,
                lead.id,
                serde_json::json!({"stage": "qualified"}),
                &meta,
            )
            .unwrap();
        assert_eq!(updated.created_by, alice.id);
    }

    #[test]
    fn delete_respects_ownership_and_elevation() {
        let h = harness();
        let acme = tenant("acme");
        let alice = principal("alice@example.com");
        let bob = principal("bob@example.com");
        let meta = RequestMeta::default();

        let lead = h
            .service
            .create(&alice, Role::Member, &acme, RecordKind::Lead, serde_json::json!({}))
            .unwrap();

        assert_eq!(
            h.service
                .delete(&bob, Role::Member, &acme, RecordKind::Lead, lead.id, &meta)
                .unwrap_err(),
            AuthError::Forbidden
        );
        assert!(h
            .service
            .delete(&bob, Role::Owner, &acme, RecordKind::Lead, lead.id, &meta)
            .is_ok());
    }

    #[test]
    fn list_is_scoped_by_role() {
        let h = harness();
        let acme = tenant("acme");
        let alice = principal("alice@example.com");
        let bob = principal("bob@example.com");

        for _ in 0..2 {
            h.service
                .create(&alice, Role::Member, &acme, RecordKind::Contact, serde_json::json!({}))
                .unwrap();
        }
        h.service
            .create(&bob, Role::Member, &acme, RecordKind::Contact, serde_json::json!({}))
            .unwrap();

        let mine = h
            .service
            .list(&alice, Role::Member, &acme, RecordKind::Contact, None)
            .unwrap();
        assert_eq!(mine.len(), 2);

        let all = h
            .service
            .list(&alice, Role::Admin, &acme, RecordKind::Contact, None)
            .unwrap();
        assert_eq!(all.len(), 3);
    }
}
