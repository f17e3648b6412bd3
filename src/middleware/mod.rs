/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth (identity pipeline), cors, http (request id / trace / limit / timeout), security headers
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
