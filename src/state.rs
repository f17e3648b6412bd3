/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - db: PgPool, id_codec: IdCodec, auth: AuthService, media: MediaStore
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - request 間で共有する可変状態は持たない
 */
use std::sync::Arc;

use crate::services::auth::{AuthService, CookiePolicy};
use crate::services::{id_codec::IdCodec, media::MediaStore};

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub id_codec: IdCodec,
    pub auth: Arc<AuthService>,
    pub cookies: CookiePolicy,
    pub media: Arc<dyn MediaStore>,
}

impl AppState {
    pub fn new(
        db: sqlx::PgPool,
        id_codec: IdCodec,
        auth: Arc<AuthService>,
        cookies: CookiePolicy,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            db,
            id_codec,
            auth,
            cookies,
            media,
        }
    }
}
