/*
 * Responsibility
 * - GET /users/me
 * - profile picture の取得 / 更新 / 削除
 * - 更新・削除は owner-only: 判定 (authz) を store 操作より先に必ず通す
 */
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::users::{PictureResponse, UserResponse},
        extractors::CurrentPrincipal,
        handlers::common::{image_body, subject_user},
    },
    error::AppError,
    services::{authz, media::MediaKey},
    state::AppState,
};

pub async fn me(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<UserResponse>, AppError> {
    let user = subject_user(&state, &principal).await?;
    Ok(Json(user.into()))
}

pub async fn get_picture(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<PictureResponse>, AppError> {
    let key = MediaKey::profile_picture(user_id);
    if !state.media.exists(&key).await? {
        return Err(AppError::NotFound("profile picture"));
    }

    Ok(Json(PictureResponse {
        url: state.media.url(&key)?.to_string(),
    }))
}

pub async fn put_picture(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(user_id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PictureResponse>, AppError> {
    authz::owner_only(&principal, &user_id.to_string()).enforce()?;
    let body = image_body(&headers, body)?;

    let key = MediaKey::profile_picture(user_id);
    state.media.put(&key, body).await?;
    tracing::info!(%user_id, backend = state.media.backend_name(), "profile picture stored");

    Ok(Json(PictureResponse {
        url: state.media.url(&key)?.to_string(),
    }))
}

pub async fn delete_picture(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    authz::owner_only(&principal, &user_id.to_string()).enforce()?;

    if state.media.delete(&MediaKey::profile_picture(user_id)).await? {
        tracing::info!(%user_id, "profile picture deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("profile picture"))
    }
}
