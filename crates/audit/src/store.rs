//! Audit store contract and in-memory implementation.

use std::sync::{Arc, RwLock};

use thiserror::Error;

use crate::entry::{AuditEntry, AuditQuery};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuditStoreError {
    #[error("audit store unavailable: {0}")]
    Unavailable(String),
}

/// Append + filtered-scan capability over audit entries.
pub trait AuditStore: Send + Sync {
    fn append(&self, entry: AuditEntry) -> Result<(), AuditStoreError>;

    /// Matching entries, newest first, truncated to `query.limit`.
    fn query(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, AuditStoreError>;
}

impl<S> AuditStore for Arc<S>
where
    S: AuditStore + ?Sized,
{
    fn append(&self, entry: AuditEntry) -> Result<(), AuditStoreError> {
        (**self).append(entry)
    }

    fn query(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, AuditStoreError> {
        (**self).query(query)
    }
}

/// In-memory append-only audit store.
///
/// Intended for tests/dev. Not optimized for large trails.
#[derive(Debug, Default)]
pub struct InMemoryAuditStore {
    entries: RwLock<Vec<AuditEntry>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditStore for InMemoryAuditStore {
    fn append(&self, entry: AuditEntry) -> Result<(), AuditStoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AuditStoreError::Unavailable("lock poisoned".to_string()))?;
        entries.push(entry);
        Ok(())
    }

    fn query(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, AuditStoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AuditStoreError::Unavailable("lock poisoned".to_string()))?;

        let mut matched: Vec<AuditEntry> = entries
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.at.cmp(&a.at).then(b.id.as_uuid().cmp(a.id.as_uuid())));

        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use tidecrm_core::{PrincipalId, TenantId};

    use crate::entry::actions;

    use super::*;

    fn tenant(s: &str) -> TenantId {
        s.parse().unwrap()
    }

    #[test]
    fn query_filters_by_actor_tenant_action_and_window() {
        let store = InMemoryAuditStore::new();
        let alice = PrincipalId::new();
        let bob = PrincipalId::new();

        store
            .append(
                AuditEntry::new(actions::ROLE_CHANGED)
                    .actor(alice)
                    .tenant(tenant("acme")),
            )
            .unwrap();
        store
            .append(
                AuditEntry::new(actions::TENANT_CREATED)
                    .actor(bob)
                    .tenant(tenant("acme")),
            )
            .unwrap();
        store
            .append(
                AuditEntry::new(actions::ROLE_CHANGED)
                    .actor(alice)
                    .tenant(tenant("globex")),
            )
            .unwrap();

        let by_actor = store
            .query(&AuditQuery {
                actor: Some(alice),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_actor.len(), 2);

        let combined = store
            .query(&AuditQuery {
                actor: Some(alice),
                tenant: Some(tenant("acme")),
                action: Some(actions::ROLE_CHANGED.to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(combined.len(), 1);

        let future_only = store
            .query(&AuditQuery {
                from: Some(Utc::now() + Duration::hours(1)),
                ..Default::default()
            })
            .unwrap();
        assert!(future_only.is_empty());
    }

    #[test]
    fn query_is_time_descending_and_limited() {
        let store = InMemoryAuditStore::new();
        for _ in 0..5 {
            store.append(AuditEntry::new(actions::TENANT_JOINED)).unwrap();
        }

        let results = store
            .query(&AuditQuery {
                limit: Some(3),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(results.len(), 3);
        assert!(results.windows(2).all(|w| w[0].at >= w[1].at));
    }
}
