/*!
 * Authenticated principal extractor
 *
 * Responsibility:
 * - access middleware が request extensions に入れた Principal を handler に渡す
 * - handler は Principal をこの extractor 経由でのみ読む
 */

mod core;

pub use core::CurrentPrincipal;
