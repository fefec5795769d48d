//! `tidecrm-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed identifiers, the role model, the error taxonomy, and the record
//! shapes shared by every other crate.

pub mod error;
pub mod id;
pub mod membership;
pub mod principal;
pub mod record;
pub mod role;
pub mod tenant;

pub use error::{AuthError, AuthResult};
pub use id::{AuditEntryId, PrincipalId, RecordId, TenantId};
pub use membership::Membership;
pub use principal::Principal;
pub use record::{RecordKind, ResourceRecord};
pub use role::Role;
pub use tenant::Tenant;
