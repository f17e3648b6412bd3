#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Identity pipeline behind the access middleware
//!
//! - protected routes never reach the handler without a verified principal
//! - every credential failure looks the same to the client
//! - the verifier runs at most once per request
//! - owner-only checks consume the principal the middleware attached

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::Path,
    http::{Request, StatusCode, header},
    response::Response,
    routing::{get, put},
};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;

use kiciti::api::v1::extractors::CurrentPrincipal;
use kiciti::error::AppError;
use kiciti::middleware::auth::access;
use kiciti::services::auth::{AuthService, Claims, TokenVerifier, VerificationError};
use kiciti::services::authz;

const KEY: &[u8] = b"integration-test-signing-key-0123456789";

/// Counts verifier invocations, then delegates to the real service.
struct Counting {
    inner: AuthService,
    calls: AtomicUsize,
}

impl Counting {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: AuthService::new(KEY, 0),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TokenVerifier for Counting {
    fn verify(&self, token: &str) -> Result<Claims, VerificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(token)
    }
}

async fn whoami(CurrentPrincipal(principal): CurrentPrincipal) -> String {
    principal.subject_id().to_string()
}

async fn update_owned(
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AppError> {
    authz::owner_only(&principal, &user_id).enforce()?;
    Ok(StatusCode::OK)
}

fn app(verifier: Arc<Counting>) -> Router {
    let protected = Router::new()
        .route("/me", get(whoami))
        .route("/users/{user_id}", put(update_owned));
    let protected = access::apply(protected, verifier);

    // Uses the extractor without the middleware in front of it
    let unguarded = Router::new().route("/unguarded", get(whoami));

    Router::new()
        .route("/public", get(|| async { "hello" }))
        .merge(protected)
        .merge(unguarded)
}

fn token_for(sub: &str) -> String {
    AuthService::new(KEY, 0)
        .issue(sub, Utc::now())
        .unwrap()
        .token
}

fn forged_for(sub: &str) -> String {
    AuthService::new(b"some-other-signing-key-0123456789abc", 0)
        .issue(sub, Utc::now())
        .unwrap()
        .token
}

async fn send(app: Router, req: Request<Body>) -> Response {
    app.oneshot(req).await.unwrap()
}

async fn json_body(res: Response) -> Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn text_body(res: Response) -> String {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get_with(uri: &str, headers: &[(&str, String)]) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, value);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn public_route_needs_no_credential() {
    let verifier = Counting::new();
    let res = send(app(verifier.clone()), get_with("/public", &[])).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(verifier.calls(), 0);
}

#[tokio::test]
async fn missing_credential_is_401_without_verifying() {
    let verifier = Counting::new();
    let res = send(app(verifier.clone()), get_with("/me", &[])).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(res).await, json!({ "message": "User not logged in" }));
    assert_eq!(verifier.calls(), 0);
}

#[tokio::test]
async fn empty_cookie_is_401_without_verifying() {
    let verifier = Counting::new();
    let res = send(
        app(verifier.clone()),
        get_with(
            "/me",
            &[
                ("cookie", "X-auth-token=".into()),
                ("x-auth-token", token_for("u1")),
            ],
        ),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(verifier.calls(), 0);
}

#[tokio::test]
async fn valid_cookie_reaches_handler_with_its_subject() {
    let verifier = Counting::new();
    let res = send(
        app(verifier.clone()),
        get_with("/me", &[("cookie", format!("X-auth-token={}", token_for("u1")))]),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(text_body(res).await, "u1");
    assert_eq!(verifier.calls(), 1);
}

#[tokio::test]
async fn header_is_used_when_no_cookie_is_sent() {
    let verifier = Counting::new();
    let res = send(
        app(verifier.clone()),
        get_with("/me", &[("X-Auth-Token", token_for("u2"))]),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(text_body(res).await, "u2");
}

#[tokio::test]
async fn cookie_wins_over_header() {
    let res = send(
        app(Counting::new()),
        get_with(
            "/me",
            &[
                ("cookie", format!("theme=dark; X-auth-token={}", token_for("u1"))),
                ("x-auth-token", token_for("u2")),
            ],
        ),
    )
    .await;

    assert_eq!(text_body(res).await, "u1");
}

#[tokio::test]
async fn forged_cookie_is_not_rescued_by_a_valid_header() {
    let verifier = Counting::new();
    let res = send(
        app(verifier.clone()),
        get_with(
            "/me",
            &[
                ("cookie", format!("X-auth-token={}", forged_for("u1"))),
                ("x-auth-token", token_for("u1")),
            ],
        ),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(verifier.calls(), 1);
}

#[tokio::test]
async fn every_failure_kind_gets_the_same_response() {
    let expired = AuthService::new(KEY, 0)
        .issue("u1", Utc::now() - Duration::hours(49))
        .unwrap()
        .token;

    let cases = [
        vec![],
        vec![("x-auth-token", "not-a-token".to_string())],
        vec![("x-auth-token", expired)],
        vec![("x-auth-token", forged_for("u1"))],
    ];

    for headers in cases {
        let res = send(app(Counting::new()), get_with("/me", &headers)).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(res).await, json!({ "message": "User not logged in" }));
    }
}

#[tokio::test]
async fn lowercase_cookie_name_is_not_a_credential() {
    let verifier = Counting::new();
    let res = send(
        app(verifier.clone()),
        get_with("/me", &[("cookie", format!("x-auth-token={}", token_for("u1")))]),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(verifier.calls(), 0);
}

#[tokio::test]
async fn owner_may_mutate_own_resource() {
    let req = Request::builder()
        .method("PUT")
        .uri("/users/u1")
        .header(header::COOKIE, format!("X-auth-token={}", token_for("u1")))
        .body(Body::empty())
        .unwrap();

    let res = send(app(Counting::new()), req).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn other_subject_is_forbidden() {
    let req = Request::builder()
        .method("PUT")
        .uri("/users/u1")
        .header(header::COOKIE, format!("X-auth-token={}", token_for("u2")))
        .body(Body::empty())
        .unwrap();

    let res = send(app(Counting::new()), req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        json_body(res).await,
        json!({ "message": "You are not allowed to perform this action" })
    );
}

#[tokio::test]
async fn unauthenticated_mutation_is_401_not_403() {
    let req = Request::builder()
        .method("PUT")
        .uri("/users/u1")
        .body(Body::empty())
        .unwrap();

    let res = send(app(Counting::new()), req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn extractor_without_middleware_rejects_even_with_a_valid_token() {
    let verifier = Counting::new();
    let res = send(
        app(verifier.clone()),
        get_with(
            "/unguarded",
            &[("cookie", format!("X-auth-token={}", token_for("u1")))],
        ),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(verifier.calls(), 0);
}

#[tokio::test]
async fn unknown_path_is_404_not_401() {
    let res = send(app(Counting::new()), get_with("/nope", &[])).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
