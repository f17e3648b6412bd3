/**
 * Responsibility
 *  - リソースごとの「意味付き ID 型」を宣言する
 *  - ./mod.rs 経由で全て公開されるため注意
 */
use super::core::PublicId;

// posts
pub enum PostTag {}
pub type PublicPostId = PublicId<PostTag>;
