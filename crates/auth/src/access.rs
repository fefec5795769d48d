//! Access Decision Engine.
//!
//! Pure decision functions over (effective role, record ownership, acting
//! principal). No IO, no panics, no side effects: callers are responsible
//! for emitting audit entries for denials that represent a security-relevant
//! attempt.

use serde::{Deserialize, Serialize};

use tidecrm_core::{AuthError, AuthResult, PrincipalId, ResourceRecord, Role};

/// Ownership predicate for collection queries.
///
/// A typed value interpreted by the query layer (never a string predicate),
/// conjoined with the query's other filters *before* pagination so page
/// boundaries stay correct. Applying the filter twice yields the same set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnershipFilter {
    /// No ownership restriction (owner/admin).
    Unrestricted,
    /// Only records created by this principal (member).
    OwnedBy(PrincipalId),
}

impl OwnershipFilter {
    pub fn for_role(role: Role, principal: PrincipalId) -> Self {
        if role.is_elevated() {
            OwnershipFilter::Unrestricted
        } else {
            OwnershipFilter::OwnedBy(principal)
        }
    }

    pub fn allows(&self, record: &ResourceRecord) -> bool {
        match self {
            OwnershipFilter::Unrestricted => true,
            OwnershipFilter::OwnedBy(principal) => record.created_by == *principal,
        }
    }
}

/// Ownership rule shared by read/update/delete.
///
/// `existing` is the creator of the record as currently stored, `None` when
/// the record does not exist. Decisions are always made against the existing
/// row, never the incoming payload.
fn require_ownership(
    role: Role,
    principal: PrincipalId,
    existing: Option<PrincipalId>,
) -> AuthResult<()> {
    if role.is_elevated() {
        return Ok(());
    }
    match existing {
        None => Err(AuthError::NotFound),
        Some(creator) if creator == principal => Ok(()),
        Some(_) => Err(AuthError::Forbidden),
    }
}

/// May `principal` read a record created by `existing`?
pub fn can_read(
    role: Role,
    principal: PrincipalId,
    existing: Option<PrincipalId>,
) -> AuthResult<()> {
    require_ownership(role, principal, existing)
}

/// Creation is always allowed: the writer becomes the owner by construction.
pub fn can_create(_role: Role) -> AuthResult<()> {
    Ok(())
}

/// Updates follow the same ownership rule as reads, evaluated against the
/// existing record.
pub fn can_update(
    role: Role,
    principal: PrincipalId,
    existing: Option<PrincipalId>,
) -> AuthResult<()> {
    require_ownership(role, principal, existing)
}

/// Owner/admin bypass ownership; members may only delete their own records.
pub fn can_delete(
    role: Role,
    principal: PrincipalId,
    existing: Option<PrincipalId>,
) -> AuthResult<()> {
    require_ownership(role, principal, existing)
}
