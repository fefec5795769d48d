//! `tidecrm-auth` — pure authorization/tenancy boundary (zero-trust).
//!
//! Every request passes Credential Verifier → Tenant Resolver → Role Resolver
//! before a handler runs; handlers consult the access decision functions
//! before touching data, and role-change paths additionally run the role
//! mutation state machine. This crate is intentionally decoupled from HTTP
//! and storage: stores are reached only through the narrow directory traits
//! defined here.

pub mod access;
pub mod claims;
pub mod resolver;
pub mod role_change;
pub mod tenant;
pub mod token;
pub mod verifier;

pub use access::{can_create, can_delete, can_read, can_update, OwnershipFilter};
pub use claims::AccessClaims;
pub use resolver::{
    AuthzModel, GlobalRoleResolver, MembershipDirectory, MembershipRoleResolver, RoleResolver,
};
pub use role_change::{authorize_role_change, RoleTransition};
pub use tenant::TenantResolver;
pub use token::{decode_token, encode_token};
pub use verifier::{CredentialVerifier, PrincipalDirectory, VerifiedIdentity};
