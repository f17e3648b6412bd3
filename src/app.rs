/*
 * Responsibility
 * - tracing / panic hook 初期化
 * - Config 読み込み → 依存生成 (PgPool, AuthService, MediaStore) → Router 組み立て
 * - Middleware の適用 (http / security headers / CORS)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::services::auth::{build_auth_service, build_cookie_policy};
use crate::services::{id_codec::IdCodec, media::LocalMediaStore};
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,kiciti=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing (stderr can be hidden depending on how the process is launched)
        tracing::error!(?info, "panic");

        // development: fail fast / production: default hook, server keeps running
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("failed to run migrations")?;

    let state = build_state(&config, db)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build process-level services and inject them into the shared application state.
pub fn build_state(config: &Config, db: sqlx::PgPool) -> Result<AppState> {
    let id_codec = IdCodec::new(config.sqids_min_length, &config.sqids_alphabet)?;
    let auth = build_auth_service(config);
    let cookies = build_cookie_policy(config);
    let media = Arc::new(LocalMediaStore::new(
        config.media_root.clone(),
        config.media_public_base_url.clone(),
    ));

    Ok(AppState::new(db, id_codec, auth, cookies, media))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes(&state))
        .nest_service("/media", ServeDir::new(&config.media_root))
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config.max_body_bytes)
}
