/*
 * Responsibility
 * - handler 間で共有する小さな helper
 *   - Principal → users 行の解決 (SubjectNotFound)
 *   - 画像アップロード body のチェック
 */
use axum::body::Bytes;
use axum::http::{HeaderMap, header};
use uuid::Uuid;

use crate::error::AppError;
use crate::repos::user_repo::{self, UserRow};
use crate::services::auth::Principal;
use crate::state::AppState;

/// The user record behind an authenticated principal.
///
/// Verified-but-unknown subjects (deleted users, foreign ids) are `SubjectNotFound`.
pub(super) async fn subject_user(state: &AppState, principal: &Principal) -> Result<UserRow, AppError> {
    let user_id = Uuid::parse_str(principal.subject_id()).map_err(|_| {
        tracing::warn!(subject_id = %principal.subject_id(), "subject is not a user id");
        AppError::SubjectNotFound
    })?;

    user_repo::get(&state.db, user_id).await?.ok_or_else(|| {
        tracing::warn!(%user_id, "verified subject has no user record");
        AppError::SubjectNotFound
    })
}

/// Raw image upload: `Content-Type: image/*` and a non-empty body.
pub(super) fn image_body(headers: &HeaderMap, body: Bytes) -> Result<Bytes, AppError> {
    let is_image = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.trim().to_ascii_lowercase().starts_with("image/"));

    if !is_image {
        return Err(AppError::bad_request("Content-Type must be an image type"));
    }
    if body.is_empty() {
        return Err(AppError::bad_request("image is empty"));
    }
    Ok(body)
}
