/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON body `{"message": ...}`)
 * - RepoError / MediaError / IdCodecError / credential failure を統一的に変換
 *
 * Notes
 * - 認証失敗 (absent/malformed/expired/forged) は外部には全て同じ 401 を返す
 *   区別はログにだけ残す
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::CredentialError;
use crate::services::id_codec::IdCodecError;
use crate::services::media::MediaError;

pub const NOT_LOGGED_IN: &str = "User not logged in";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] CredentialError),
    #[error("forbidden")]
    Forbidden,
    #[error("subject not found")]
    SubjectNotFound,
    #[error("not found: {0}")]
    NotFound(&'static str),
    #[error("internal server error")]
    Internal,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::SubjectNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client.
    pub fn public_message(&self) -> String {
        match self {
            AppError::BadRequest(message) => message.clone(),
            AppError::Unauthorized(_) => NOT_LOGGED_IN.to_string(),
            AppError::Forbidden => "You are not allowed to perform this action".to_string(),
            AppError::SubjectNotFound => "User not found".to_string(),
            AppError::NotFound(resource) => format!("{resource} not found"),
            AppError::Internal => "internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            message: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::bad_request("User already exists"),
            RepoError::Db(err) => {
                tracing::error!(error = %err, "database error");
                AppError::Internal
            }
        }
    }
}

impl From<MediaError> for AppError {
    fn from(e: MediaError) -> Self {
        tracing::error!(error = %e, "media store error");
        AppError::Internal
    }
}

impl From<IdCodecError> for AppError {
    fn from(e: IdCodecError) -> Self {
        match e {
            // Client supplied a malformed public id (e.g. /posts/{id})
            IdCodecError::DecodeInvalidFormat | IdCodecError::DecodeOutOfRange => {
                AppError::bad_request("invalid id")
            }
            // server-side config / programming errors
            other => {
                tracing::error!(error = %other, "id codec error");
                AppError::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn every_credential_failure_looks_the_same() {
        for kind in [
            CredentialError::Absent,
            CredentialError::Malformed,
            CredentialError::Expired,
            CredentialError::Forged,
        ] {
            let (status, body) = body_json(AppError::Unauthorized(kind)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body, serde_json::json!({ "message": "User not logged in" }));
        }
    }

    #[tokio::test]
    async fn forbidden_is_distinct_from_unauthorized() {
        let (status, body) = body_json(AppError::Forbidden).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_ne!(body["message"], NOT_LOGGED_IN);
    }

    #[test]
    fn unique_violation_maps_to_user_exists() {
        let err = AppError::from(RepoError::Conflict);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "User already exists");
    }

    #[test]
    fn malformed_public_id_is_bad_request() {
        let err = AppError::from(IdCodecError::DecodeInvalidFormat);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
