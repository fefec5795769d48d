//! Authorization error taxonomy.

use thiserror::Error;

/// Result type used across the authorization path.
pub type AuthResult<T> = Result<T, AuthError>;

/// Terminal authorization/tenancy failure.
///
/// Authorization failures are terminal for the request: no retry, no partial
/// execution of the guarded operation. This enum is deliberately closed: the
/// HTTP layer maps each variant to exactly one status code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Missing, malformed, unsigned, or expired credential.
    #[error("unauthorized")]
    Unauthorized,

    /// Authenticated but not permitted (disabled account, wrong role,
    /// ownership mismatch, privilege-escalation attempt).
    #[error("forbidden")]
    Forbidden,

    /// Not a recognized member of the requested tenant (membership model).
    #[error("not a member of tenant '{0}'")]
    ForbiddenTenant(String),

    /// Resource or membership does not exist.
    #[error("not found")]
    NotFound,

    /// Duplicate tenant identifier or duplicate membership.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Malformed identifier or role value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Infrastructure failure surfaced at the boundary (storage unavailable).
    #[error("internal: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
