//! Best-effort audit recording.

use crate::entry::{AuditEntry, AuditQuery};
use crate::store::{AuditStore, AuditStoreError};

/// Wraps an [`AuditStore`] so append failures are logged and swallowed.
///
/// The primary request path must never block on, retry, or fail because of
/// audit logging. A crash between a mutation and its audit append is
/// tolerated: completeness is best-effort, not exactly-once.
#[derive(Debug, Clone)]
pub struct AuditRecorder<S> {
    store: S,
}

impl<S: AuditStore> AuditRecorder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Append `entry`, logging (never propagating) failures.
    pub fn record(&self, entry: AuditEntry) {
        let action = entry.action.clone();
        if let Err(e) = self.store.append(entry) {
            tracing::warn!(action, error = %e, "audit append failed; continuing");
        }
    }

    /// Read side: queries go straight through, failures included.
    pub fn query(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, AuditStoreError> {
        self.store.query(query)
    }
}
