/*
 * Responsibility
 * - 環境変数の読み込み (DATABASE_URL, AUTH_TOKEN_SECRET, CORS, media など)
 * - 設定値のバリデーション (不足・不正なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use url::Url;

/// Minimum HMAC key length accepted for token signing.
pub const MIN_TOKEN_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,
    pub max_body_bytes: usize,

    pub sqids_min_length: usize,
    pub sqids_alphabet: String,

    pub auth_token_secret: String,
    pub auth_token_leeway_seconds: u64,
    pub auth_mirror_token_header: bool,

    pub media_root: PathBuf,
    pub media_public_base_url: Url,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the database url or the signing key
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("auth_token_leeway_seconds", &self.auth_token_leeway_seconds)
            .field("auth_mirror_token_header", &self.auth_mirror_token_header)
            .field("media_root", &self.media_root)
            .field("media_public_base_url", &self.media_public_base_url.as_str())
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = parse_or("PORT", env_var("PORT").as_deref(), 3000)?;

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = parse_origins(
            &std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default(),
        );

        let max_body_bytes: usize = parse_or(
            "MAX_BODY_BYTES",
            env_var("MAX_BODY_BYTES").as_deref(),
            5 * 1024 * 1024,
        )?;

        let sqids_min_length: usize =
            parse_or("SQIDS_MIN_LENGTH", env_var("SQIDS_MIN_LENGTH").as_deref(), 10)?;

        let sqids_alphabet = std::env::var("SQIDS_ALPHABET").unwrap_or_else(|_| {
            "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789".to_string()
        });

        let auth_token_secret = std::env::var("AUTH_TOKEN_SECRET")
            .map_err(|_| ConfigError::Missing("AUTH_TOKEN_SECRET"))?;
        validate_token_secret(&auth_token_secret)?;

        let auth_token_leeway_seconds: u64 = parse_or(
            "AUTH_TOKEN_LEEWAY_SECONDS",
            env_var("AUTH_TOKEN_LEEWAY_SECONDS").as_deref(),
            0,
        )?;

        let auth_mirror_token_header = match std::env::var("AUTH_MIRROR_TOKEN_HEADER") {
            Ok(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid("AUTH_MIRROR_TOKEN_HEADER"))?,
            Err(_) => true,
        };

        let media_root = PathBuf::from(
            std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "./media".to_string()),
        );

        let media_public_base_url = std::env::var("MEDIA_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}/media/", port));
        let media_public_base_url = parse_base_url(&media_public_base_url)
            .ok_or(ConfigError::Invalid("MEDIA_PUBLIC_BASE_URL"))?;

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            max_body_bytes,
            sqids_min_length,
            sqids_alphabet,
            auth_token_secret,
            auth_token_leeway_seconds,
            auth_mirror_token_header,
            media_root,
            media_public_base_url,
        })
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

// Unset falls back to `default`; set but unparsable fails start-up
fn parse_or<T: FromStr>(
    key: &'static str,
    raw: Option<&str>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn validate_token_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_TOKEN_SECRET_BYTES {
        return Err(ConfigError::Invalid("AUTH_TOKEN_SECRET"));
    }
    Ok(())
}

// Url::join drops the last path segment unless the base ends with '/'
fn parse_base_url(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).ok()
}
