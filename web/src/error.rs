//! HTTP mapping of the core error taxonomy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use trailbound_core::Error;

/// Result alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Wrapper turning a core error into an HTTP response.
///
/// Operational errors surface their message verbatim with `status: fail`
/// (client errors) or `status: error` (upstream). Database and internal
/// errors are logged in full and answered with a generic message.
#[derive(Debug)]
pub struct AppError(pub Error);

impl From<Error> for AppError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        tracing::error!(%error, "unexpected failure in handler");
        Self(Error::Internal)
    }
}

const fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        Error::Forbidden(_) => StatusCode::FORBIDDEN,
        Error::NotFound { .. } => StatusCode::NOT_FOUND,
        Error::Conflict(_) => StatusCode::CONFLICT,
        Error::Upstream(_) => StatusCode::BAD_GATEWAY,
        Error::Database(_) | Error::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let message = if self.0.is_operational() {
            self.0.to_string()
        } else {
            tracing::error!(error = %self.0, "request failed with non-operational error");
            "something went very wrong".to_string()
        };
        let kind = if status.is_client_error() { "fail" } else { "error" };
        (status, Json(json!({ "status": kind, "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_expected_statuses() {
        assert_eq!(status_for(&Error::validation("x")), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&Error::unauthenticated("x")),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_for(&Error::forbidden("x")), StatusCode::FORBIDDEN);
        assert_eq!(
            status_for(&Error::not_found("Tour", "t")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_for(&Error::conflict("x")), StatusCode::CONFLICT);
        assert_eq!(
            status_for(&Error::Upstream("x".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&Error::Database("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
