/*
 * Responsibility
 * - /posts 系 handler (作成 / feed / 画像追加 / 削除)
 * - Path の {post_id} は公開 ID → extractor で内部 ID に復号して受け取る
 * - author は Principal から決める。画像追加・削除は owner-only
 */
use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
};

use crate::{
    api::v1::{
        dto::posts::{CreatePostRequest, CreatePostResponse, FeedQuery, PostResponse},
        extractors::{CurrentPrincipal, public_id::PublicPostId},
        handlers::common::{image_body, subject_user},
    },
    error::AppError,
    repos::post_repo::{self, PostRow, SlotReservation},
    services::{
        auth::Principal,
        authz,
        media::{MAX_POST_IMAGES, MediaKey},
    },
    state::AppState,
};

fn row_to_response(state: &AppState, row: PostRow) -> Result<PostResponse, AppError> {
    let images = (0..row.image_count)
        .map(|index| {
            state
                .media
                .url(&MediaKey::post_image(row.post_id, index))
                .map(|url| url.to_string())
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PostResponse {
        id: state.id_codec.encode(row.post_id)?,
        user_id: row.user_id,
        content: row.content,
        images,
        created_at: row.created_at,
    })
}

async fn owned_post(
    state: &AppState,
    principal: &Principal,
    post_id: i64,
) -> Result<PostRow, AppError> {
    let post = post_repo::get(&state.db, post_id)
        .await?
        .ok_or(AppError::NotFound("post"))?;

    authz::owner_only(principal, &post.user_id.to_string()).enforce()?;
    Ok(post)
}

pub async fn feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let (limit, offset) = query.window();
    let rows = post_repo::list(&state.db, limit, offset).await?;

    let mut res = Vec::with_capacity(rows.len());
    for row in rows {
        res.push(row_to_response(&state, row)?);
    }

    Ok(Json(res))
}

pub async fn create_post(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Json(req): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<CreatePostResponse>), AppError> {
    let content = req.validate().map_err(AppError::bad_request)?;
    let author = subject_user(&state, &principal).await?;

    let row = post_repo::create(&state.db, author.user_id, content).await?;
    tracing::info!(post_id = row.post_id, user_id = %author.user_id, "post created");

    Ok((
        StatusCode::CREATED,
        Json(CreatePostResponse {
            message: "Post created successfully!",
            status: "OK",
            post: row_to_response(&state, row)?,
        }),
    ))
}

pub async fn add_image(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    post_id: PublicPostId,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PostResponse>, AppError> {
    let mut post = owned_post(&state, &principal, post_id.id).await?;
    let body = image_body(&headers, body)?;

    let slot = match post_repo::reserve_image_slot(&state.db, post.post_id, MAX_POST_IMAGES)
        .await?
    {
        SlotReservation::Reserved(slot) => slot,
        SlotReservation::Full => {
            return Err(AppError::bad_request(format!(
                "a post can have at most {MAX_POST_IMAGES} images"
            )));
        }
        SlotReservation::Missing => return Err(AppError::NotFound("post")),
    };

    // A failed put drops the slot, rolling the reservation back
    let key = MediaKey::post_image(post.post_id, slot.index());
    state.media.put(&key, body).await?;

    post.image_count = match slot.commit().await {
        Ok(count) => count,
        Err(e) => {
            if let Err(cleanup) = state.media.delete(&key).await {
                tracing::warn!(error = %cleanup, key = key.as_str(), "orphaned post image");
            }
            return Err(e.into());
        }
    };

    Ok(Json(row_to_response(&state, post)?))
}

pub async fn delete_post(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    post_id: PublicPostId,
) -> Result<StatusCode, AppError> {
    let post = owned_post(&state, &principal, post_id.id).await?;

    for index in 0..post.image_count {
        state
            .media
            .delete(&MediaKey::post_image(post.post_id, index))
            .await?;
    }

    if post_repo::delete(&state.db, post.post_id).await? {
        tracing::info!(post_id = post.post_id, "post deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("post"))
    }
}
