/*
 * Responsibility
 * - Posts の request/response DTO
 * - 公開 ID は encode 済みの値を返す (内部 ID を漏らさない)
 * - author は body からは受け取らない (Principal から決める)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CONTENT_MAX: usize = 2000;
pub const FEED_DEFAULT_LIMIT: i64 = 20;
pub const FEED_MAX_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
}

impl CreatePostRequest {
    pub fn validate(&self) -> Result<&str, &'static str> {
        let content = self.content.trim();
        if content.is_empty() {
            return Err("content is required");
        }
        if content.chars().count() > CONTENT_MAX {
            return Err("content must be at most 2000 characters long");
        }
        Ok(content)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl FeedQuery {
    /// `(limit, offset)` with page >= 1 and limit in 1..=50.
    pub fn window(&self) -> (i64, i64) {
        let limit = self
            .limit
            .unwrap_or(FEED_DEFAULT_LIMIT)
            .clamp(1, FEED_MAX_LIMIT);
        let page = self.page.unwrap_or(1).max(1);
        (limit, (page - 1).saturating_mul(limit))
    }
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: String, // encoded
    pub user_id: Uuid,
    pub content: String,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CreatePostResponse {
    pub message: &'static str,
    pub status: &'static str,
    pub post: PostResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_is_trimmed_and_bounded() {
        let ok = CreatePostRequest {
            content: "  hello  ".into(),
        };
        assert_eq!(ok.validate(), Ok("hello"));

        let blank = CreatePostRequest {
            content: "   ".into(),
        };
        assert!(blank.validate().is_err());

        let long = CreatePostRequest {
            content: "x".repeat(CONTENT_MAX + 1),
        };
        assert!(long.validate().is_err());
    }

    #[test]
    fn feed_window_defaults_and_clamps() {
        assert_eq!(FeedQuery::default().window(), (20, 0));
        assert_eq!(
            FeedQuery {
                page: Some(3),
                limit: Some(10)
            }
            .window(),
            (10, 20)
        );
        assert_eq!(
            FeedQuery {
                page: Some(0),
                limit: Some(500)
            }
            .window(),
            (50, 0)
        );
        assert_eq!(
            FeedQuery {
                page: Some(-4),
                limit: Some(0)
            }
            .window(),
            (1, 0)
        );
    }
}
