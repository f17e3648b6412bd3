/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 認証が必要な route だけをまとめて access middleware を route_layer で掛ける
 *   (handler 側で個別に認証チェックしない)
 */
use axum::{
    Router,
    routing::{get, post, put},
};

use crate::middleware::auth::access;
use crate::state::AppState;

use crate::api::v1::handlers::{
    auth::{login, logout, signup},
    health::health,
    posts::{add_image, create_post, delete_post, feed},
    users::{delete_picture, get_picture, me, put_picture},
};

pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health))
        .route("/users/create", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/posts", get(feed))
        .route("/users/{user_id}/pfp", get(get_picture));

    let protected = Router::new()
        .route("/users/me", get(me))
        .route(
            "/users/{user_id}/pfp",
            put(put_picture).delete(delete_picture),
        )
        .route("/posts", post(create_post))
        .route("/posts/{post_id}", axum::routing::delete(delete_post))
        .route("/posts/{post_id}/images", post(add_image));

    let protected = access::apply(protected, state.auth.clone());

    public.merge(protected)
}
