/*
 * Responsibility
 * - posts の作成・feed 取得・画像枚数・削除
 * - user_id の FK (CASCADE) 前提で削除挙動を意識
 */
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub post_id: i64,
    pub user_id: Uuid,
    pub content: String,
    pub image_count: i32,
    pub created_at: DateTime<Utc>,
}

pub async fn create(db: &PgPool, user_id: Uuid, content: &str) -> RepoResult<PostRow> {
    let row = sqlx::query_as::<_, PostRow>(
        r#"
        INSERT INTO posts (user_id, content)
        VALUES ($1, $2)
        RETURNING post_id, user_id, content, image_count, created_at
        "#,
    )
    .bind(user_id)
    .bind(content)
    .fetch_one(db)
    .await?;

    Ok(row)
}

/// Newest first.
pub async fn list(db: &PgPool, limit: i64, offset: i64) -> RepoResult<Vec<PostRow>> {
    let rows = sqlx::query_as::<_, PostRow>(
        r#"
        SELECT post_id, user_id, content, image_count, created_at
        FROM posts
        ORDER BY created_at DESC, post_id DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn get(db: &PgPool, post_id: i64) -> RepoResult<Option<PostRow>> {
    let row = sqlx::query_as::<_, PostRow>(
        r#"
        SELECT post_id, user_id, content, image_count, created_at
        FROM posts
        WHERE post_id = $1
        "#,
    )
    .bind(post_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

/// Outcome of `reserve_image_slot`.
pub enum SlotReservation {
    Reserved(ImageSlot),
    Full,
    Missing,
}

/// An image slot on a post whose row stays locked until `commit` (or drop, which rolls back).
///
/// Concurrent uploads to the same post wait on the lock, so slots are handed out in order
/// and a failed upload never leaves a gap.
pub struct ImageSlot {
    tx: Transaction<'static, Postgres>,
    post_id: i64,
    index: i32,
}

impl ImageSlot {
    pub fn index(&self) -> i32 {
        self.index
    }

    /// Record the stored image. Returns the post's new image count.
    pub async fn commit(mut self) -> RepoResult<i32> {
        let count = self.index + 1;
        sqlx::query(
            r#"
            UPDATE posts
            SET image_count = $2
            WHERE post_id = $1
            "#,
        )
        .bind(self.post_id)
        .bind(count)
        .execute(&mut *self.tx)
        .await?;

        self.tx.commit().await?;
        Ok(count)
    }
}

/// Next free index for a post holding `count` images, if under `max_images`.
fn next_image_slot(count: i32, max_images: i32) -> Option<i32> {
    (0..max_images).contains(&count).then_some(count)
}

/// Lock the post row and reserve the next image slot.
pub async fn reserve_image_slot(
    db: &PgPool,
    post_id: i64,
    max_images: i32,
) -> RepoResult<SlotReservation> {
    let mut tx = db.begin().await?;

    let count: Option<(i32,)> = sqlx::query_as(
        r#"
        SELECT image_count
        FROM posts
        WHERE post_id = $1
        FOR UPDATE
        "#,
    )
    .bind(post_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some((count,)) = count else {
        return Ok(SlotReservation::Missing);
    };

    Ok(match next_image_slot(count, max_images) {
        Some(index) => SlotReservation::Reserved(ImageSlot { tx, post_id, index }),
        None => SlotReservation::Full,
    })
}

pub async fn delete(db: &PgPool, post_id: i64) -> RepoResult<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM posts
        WHERE post_id = $1
        "#,
    )
    .bind(post_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_handed_out_in_order_up_to_the_limit() {
        assert_eq!(next_image_slot(0, 4), Some(0));
        assert_eq!(next_image_slot(3, 4), Some(3));
        assert_eq!(next_image_slot(4, 4), None);
        assert_eq!(next_image_slot(7, 4), None);
    }

    #[test]
    fn corrupt_negative_count_gets_no_slot() {
        assert_eq!(next_image_slot(-1, 4), None);
    }
}
