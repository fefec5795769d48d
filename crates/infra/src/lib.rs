//! `tidecrm-infra` — storage collaborator contracts and the services that
//! compose them with the authorization engine.
//!
//! The storage engine itself is out of scope: these traits assume a
//! transactional store with single-statement update semantics ("last write
//! wins" on a role row is acceptable). In-memory implementations back tests
//! and local development.

pub mod admin;
pub mod directory;
pub mod memory;
pub mod records;
pub mod store;

pub use admin::AdminService;
pub use directory::Directory;
pub use memory::{
    InMemoryMembershipStore, InMemoryPrincipalStore, InMemoryRecordStore, InMemoryTenantStore,
};
pub use records::RecordService;
pub use store::{MembershipStore, PrincipalStore, RecordStore, StoreError, TenantStore};
