use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use models::Character;
use service::characters::CharacterInput;
use tracing::info;

use crate::{errors::JsonApiError, state::AppState};

/// 列出所有角色
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Character>>, JsonApiError> {
    let list = state.characters.list().await?;
    info!(count = list.len(), "list characters");
    Ok(Json(list))
}

/// 获取指定角色
pub async fn get(State(state): State<AppState>, path: Result<Path<i32>, PathRejection>) -> Result<Json<Character>, JsonApiError> {
    let Path(id) = path?;
    Ok(Json(state.characters.get(id).await?))
}

/// 创建角色：201 + Location
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CharacterInput>, JsonRejection>,
) -> Result<impl IntoResponse, JsonApiError> {
    let Json(input) = payload?;
    let created = state.characters.create(input).await?;
    let location = format!("/api/characters/{}", created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<CharacterInput>, JsonRejection>,
) -> Result<Json<Character>, JsonApiError> {
    let Path(id) = path?;
    let Json(input) = payload?;
    Ok(Json(state.characters.update(id, input).await?))
}

/// The response never waits for image cleanup.
pub async fn delete(State(state): State<AppState>, path: Result<Path<i32>, PathRejection>) -> Result<StatusCode, JsonApiError> {
    let Path(id) = path?;
    state.characters.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Raw image bytes in the body.
pub async fn upload_image(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    body: Bytes,
) -> Result<Json<Character>, JsonApiError> {
    let Path(id) = path?;
    Ok(Json(state.characters.upload_image(id, body.to_vec()).await?))
}
