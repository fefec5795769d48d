//! Role Mutation State Machine.
//!
//! Legal transitions when one principal changes another's role. The rules
//! are checked in order; the first violation wins. This module only decides.
//! Applying the transition (the single-row update plus its audit entry) is
//! the administrative service's job.

use serde::{Deserialize, Serialize};

use tidecrm_core::{AuthError, AuthResult, PrincipalId, Role};

/// An authorized role transition, ready to apply.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTransition {
    pub previous: Role,
    pub new: Role,
}

/// Decide whether `actor` may set `target`'s role to `new_role`.
///
/// `target_role` is the target's current role in the scope being mutated,
/// `None` when the target is not a recognized member of that scope.
///
/// Rules, first violation wins:
/// 1. actor must hold `admin` or `owner` → `Forbidden`;
/// 2. target must be a member of the scope → `NotFound`;
/// 3. an actor may never change their own role away from `owner` (a
///    workspace must keep a reachable owner) → `Forbidden`;
/// 4. an `admin` may only assign `member`/`admin` and may not touch a
///    target that is currently `owner` → `Forbidden`;
/// 5. an `owner` may set any role, including promoting to or demoting from
///    `owner`.
pub fn authorize_role_change(
    actor: PrincipalId,
    actor_role: Role,
    target: PrincipalId,
    target_role: Option<Role>,
    new_role: Role,
) -> AuthResult<RoleTransition> {
    if !actor_role.is_elevated() {
        return Err(AuthError::Forbidden);
    }

    let previous = target_role.ok_or(AuthError::NotFound)?;

    if actor == target && previous == Role::Owner && new_role != Role::Owner {
        return Err(AuthError::Forbidden);
    }

    if actor_role == Role::Admin && (new_role == Role::Owner || previous == Role::Owner) {
        return Err(AuthError::Forbidden);
    }

    Ok(RoleTransition {
        previous,
        new: new_role,
    })
}
