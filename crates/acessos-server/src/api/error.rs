//! API error responses
//!
//! Every failure is returned as `{timestamp, status, erro, mensagem}`.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use acessos_core::VaultError;

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub erro: String,
    pub mensagem: String,
}

/// API error type that can be converted to HTTP responses
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn too_many_requests() -> Self {
        Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests. Please try again in a minute.",
        )
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "An internal error occurred. Please try again later.",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            timestamp: Utc::now(),
            status: self.status.as_u16(),
            erro: self
                .status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            mensagem: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<VaultError> for ApiError {
    fn from(err: VaultError) -> Self {
        let status = match &err {
            VaultError::AuthenticationFailed
            | VaultError::SessionExpired
            | VaultError::InvalidSession => StatusCode::UNAUTHORIZED,
            VaultError::Forbidden(_) => StatusCode::FORBIDDEN,
            VaultError::NotFound(_) => StatusCode::NOT_FOUND,
            VaultError::Validation(_) => StatusCode::BAD_REQUEST,
            VaultError::Conflict(_) => StatusCode::CONFLICT,
            _ => {
                error!("Internal error: {}", err);
                return ApiError::internal();
            }
        };
        ApiError::new(status, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(format!("Invalid query string: {}", rejection.body_text()))
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_mapping() {
        let cases = [
            (VaultError::AuthenticationFailed, StatusCode::UNAUTHORIZED),
            (VaultError::SessionExpired, StatusCode::UNAUTHORIZED),
            (VaultError::forbidden("no"), StatusCode::FORBIDDEN),
            (VaultError::not_found("gone"), StatusCode::NOT_FOUND),
            (VaultError::validation("bad"), StatusCode::BAD_REQUEST),
            (VaultError::Conflict("dup".to_string()), StatusCode::CONFLICT),
            (VaultError::StorageError("disk".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = ApiError::from(VaultError::DecryptionError("tag mismatch".to_string()));
        assert!(!err.message.contains("tag mismatch"));
    }

    #[test]
    fn test_authentication_message() {
        let err = ApiError::from(VaultError::AuthenticationFailed);
        assert_eq!(err.message, "Invalid email or password");
    }
}
