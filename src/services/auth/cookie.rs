//! Delivering an issued token at the HTTP boundary.
//!
//! - `Set-Cookie: X-auth-token=...; Path=/; Max-Age=...; HttpOnly; SameSite=Lax[; Secure]`
//! - optionally mirrored into the `x-auth-token` response header for API clients

use axum::http::{HeaderMap, HeaderValue, header};

use crate::error::AppError;
use crate::services::auth::access_jwt::IssuedToken;
use crate::services::auth::credential::{TOKEN_COOKIE, TOKEN_HEADER};

/// How issued tokens are handed to the client.
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    pub secure: bool,
    pub mirror_header: bool,
}

impl CookiePolicy {
    /// Response headers carrying `issued` to the client.
    pub fn deliver(&self, issued: &IssuedToken) -> Result<HeaderMap, AppError> {
        let max_age = (issued.expires_at - issued.issued_at).num_seconds().max(0);
        let cookie = build_cookie(&issued.token, max_age, self.secure);

        let mut headers = HeaderMap::new();
        headers.insert(header::SET_COOKIE, header_value(&cookie)?);

        if self.mirror_header {
            headers.insert(TOKEN_HEADER, header_value(&issued.token)?);
        }

        Ok(headers)
    }

    /// Response headers removing the token cookie.
    pub fn clear(&self) -> Result<HeaderMap, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::SET_COOKIE,
            header_value(&build_cookie("", 0, self.secure))?,
        );
        Ok(headers)
    }
}

fn build_cookie(value: &str, max_age: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        TOKEN_COOKIE, value, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn header_value(raw: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(raw).map_err(|e| {
        tracing::error!(error = %e, "token is not a valid header value");
        AppError::Internal
    })
}
