//! `tidecrm-audit` — append-only trail of security-relevant decisions and
//! mutations.
//!
//! Audit is observability, not a gate: appends are best-effort and must never
//! abort the business operation that triggered them.

pub mod entry;
pub mod recorder;
pub mod store;

pub use entry::{actions, AuditEntry, AuditQuery, RequestMeta};
pub use recorder::AuditRecorder;
pub use store::{AuditStore, AuditStoreError, InMemoryAuditStore};
