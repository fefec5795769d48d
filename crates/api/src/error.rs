//! Mapping from the error taxonomy to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use tidecrm_core::AuthError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

/// API-level error wrapper.
///
/// Credential-phase failures must go through [`ApiError::authentication`],
/// which collapses the underlying cause (signature, expiry, disabled
/// account) into one undifferentiated 401 so callers cannot enumerate
/// accounts.
#[derive(Debug)]
pub enum ApiError {
    Authentication,
    Auth(AuthError),
}

impl ApiError {
    pub fn authentication() -> Self {
        ApiError::Authentication
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Auth(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::Authentication => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "authentication failed".to_string(),
            ),
            ApiError::Auth(e) => {
                let (status, code) = match &e {
                    AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
                    AuthError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
                    AuthError::ForbiddenTenant(_) => (StatusCode::FORBIDDEN, "forbidden_tenant"),
                    AuthError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
                    AuthError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
                    AuthError::InvalidArgument(_) => {
                        (StatusCode::BAD_REQUEST, "invalid_argument")
                    }
                    AuthError::Internal(_) => {
                        tracing::error!(error = %e, "internal error");
                        (StatusCode::INTERNAL_SERVER_ERROR, "internal")
                    }
                };
                let message = match &e {
                    // Don't leak internal diagnostics to callers.
                    AuthError::Internal(_) => "internal error".to_string(),
                    other => other.to_string(),
                };
                (status, code, message)
            }
        };

        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: AuthError) -> StatusCode {
        ApiError::from(e).into_response().status()
    }

    #[test]
    fn taxonomy_maps_to_expected_statuses() {
        assert_eq!(status_of(AuthError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(AuthError::ForbiddenTenant("acme".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_of(AuthError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(AuthError::conflict("dup")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AuthError::invalid_argument("bad")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AuthError::internal("boom")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn authentication_failure_is_undifferentiated() {
        let response = ApiError::authentication().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
