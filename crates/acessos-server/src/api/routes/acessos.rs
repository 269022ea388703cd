//! Credential endpoints

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::auth::AuthSession;
use crate::api::error::ApiResult;
use crate::api::AppState;
use acessos_core::{AcessoView, NewAcesso, UpdateAcesso};

/// Reveal response
#[derive(Debug, Serialize)]
pub struct RevealResponse {
    pub senha: String,
    pub mensagem: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub titulo: String,
}

pub async fn list(
    State(state): State<AppState>,
    session: AuthSession,
) -> ApiResult<Json<Vec<AcessoView>>> {
    Ok(Json(state.vault.visible_acessos(session.principal()).await?))
}

pub async fn create(
    State(state): State<AppState>,
    session: AuthSession,
    payload: Result<Json<NewAcesso>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AcessoView>)> {
    let Json(new) = payload?;
    let view = state.vault.acessos.create(session.principal(), new).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get(
    State(state): State<AppState>,
    session: AuthSession,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<AcessoView>> {
    let Path(id) = path?;
    Ok(Json(state.vault.acessos.get(session.principal(), id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    session: AuthSession,
    path: Result<Path<u64>, PathRejection>,
    payload: Result<Json<UpdateAcesso>, JsonRejection>,
) -> ApiResult<Json<AcessoView>> {
    let Path(id) = path?;
    let Json(update) = payload?;
    Ok(Json(
        state
            .vault
            .acessos
            .update(session.principal(), id, update)
            .await?,
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    session: AuthSession,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    state.vault.acessos.delete(session.principal(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reveal(
    State(state): State<AppState>,
    session: AuthSession,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<RevealResponse>> {
    let Path(id) = path?;
    let revealed = state.vault.acessos.reveal(session.principal(), id).await?;
    Ok(Json(RevealResponse {
        senha: revealed.secret.into_inner(),
        mensagem: revealed.message,
    }))
}

pub async fn list_shared(
    State(state): State<AppState>,
    session: AuthSession,
) -> ApiResult<Json<Vec<AcessoView>>> {
    Ok(Json(state.vault.acessos.list_shared(session.principal()).await?))
}

pub async fn list_personal(
    State(state): State<AppState>,
    session: AuthSession,
) -> ApiResult<Json<Vec<AcessoView>>> {
    Ok(Json(state.vault.acessos.list_personal(session.principal()).await?))
}

pub async fn search(
    State(state): State<AppState>,
    session: AuthSession,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<AcessoView>>> {
    let Query(query) = query?;
    Ok(Json(
        state
            .vault
            .acessos
            .search_by_title(session.principal(), &query.titulo)
            .await?,
    ))
}
