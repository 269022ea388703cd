//! Bearer token authentication
//!
//! Handlers that take an [`AuthSession`] only run for requests carrying a
//! valid `Authorization: Bearer <token>` header.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;

use super::error::ApiError;
use super::AppState;
use acessos_core::Principal;

/// The authenticated caller of a request
#[derive(Debug, Clone)]
pub struct AuthSession(pub Principal);

impl AuthSession {
    pub fn principal(&self) -> &Principal {
        &self.0
    }
}

/// Extract the bearer token from the request headers
fn extract_bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Authentication required."))?;

    let value = header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid token format."))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Invalid token format."))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)?;

        let principal = state.vault.authenticate_token(token).await.map_err(|e| {
            debug!("Rejected bearer token: {}", e);
            ApiError::from(e)
        })?;

        Ok(AuthSession(principal))
    }
}
