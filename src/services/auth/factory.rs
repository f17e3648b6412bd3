/// Factory: build `AuthService` and the cookie policy from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::AuthService;
use crate::services::auth::cookie::CookiePolicy;

pub fn build_auth_service(config: &Config) -> Arc<AuthService> {
    Arc::new(AuthService::new(
        config.auth_token_secret.as_bytes(),
        config.auth_token_leeway_seconds,
    ))
}

pub fn build_cookie_policy(config: &Config) -> CookiePolicy {
    CookiePolicy {
        secure: config.app_env.is_production(),
        mirror_header: config.auth_mirror_token_header,
    }
}
