//! User administration endpoints

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;

use crate::api::auth::AuthSession;
use crate::api::error::ApiResult;
use crate::api::AppState;
use acessos_core::UserView;

pub async fn list(
    State(state): State<AppState>,
    session: AuthSession,
) -> ApiResult<Json<Vec<UserView>>> {
    Ok(Json(state.vault.users.list(session.principal()).await?))
}

pub async fn get(
    State(state): State<AppState>,
    session: AuthSession,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<UserView>> {
    let Path(id) = path?;
    Ok(Json(state.vault.users.get(session.principal(), id).await?))
}
