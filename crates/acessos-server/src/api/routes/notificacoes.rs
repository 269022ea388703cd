//! Notification feed endpoints

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::auth::AuthSession;
use crate::api::error::ApiResult;
use crate::api::AppState;
use acessos_core::Notification;

/// Never fails once authenticated: a failed refresh still returns the feed
pub async fn list(State(state): State<AppState>, session: AuthSession) -> Json<Vec<Notification>> {
    Json(state.vault.notifications(session.principal()).await)
}

pub async fn dismiss(
    State(state): State<AppState>,
    session: AuthSession,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    state
        .vault
        .dismiss_notification(session.principal(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear(State(state): State<AppState>, session: AuthSession) -> StatusCode {
    state.vault.clear_notifications(session.principal()).await;
    StatusCode::NO_CONTENT
}
