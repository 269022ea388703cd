//! Login and user registration

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::auth::AuthSession;
use crate::api::error::ApiResult;
use crate::api::AppState;
use acessos_core::{NewUser, Role, UserView};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub senha: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub nome: String,
    pub email: String,
    pub role: Role,
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(request) = payload?;

    let session = state.vault.login(&request.email, &request.senha).await?;
    info!("User {} logged in", session.user_id);

    Ok(Json(LoginResponse {
        token: session.token,
        nome: session.name,
        email: session.email,
        role: session.role,
    }))
}

pub async fn register(
    State(state): State<AppState>,
    session: AuthSession,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserView>)> {
    let Json(new) = payload?;
    let user = state.vault.users.register(session.principal(), new).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
