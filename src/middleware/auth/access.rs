//! Identity pipeline middleware: credential → verify → `Principal` in extensions
//!
//! - 認証が必要な route にだけ `route_layer` で掛ける
//! - 失敗時は 401 `{"message": "User not logged in"}` を返し、handler は実行されない
//! - 成功時は `Principal` を request extensions に 1 回だけ入れる (唯一の置き場所)

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::auth::{Principal, TokenVerifier, authenticate};

/// Apply the identity pipeline to every route currently in `router`.
///
/// 例：
/// ```ignore
/// let protected = middleware::auth::access::apply(protected, state.auth.clone());
/// let v1 = public.merge(protected);
/// ```
pub fn apply<S>(router: Router<S>, verifier: Arc<dyn TokenVerifier>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    // route_layer: unmatched paths still fall through to 404 instead of 401
    router.route_layer(middleware::from_fn_with_state(verifier, access_middleware))
}

async fn access_middleware(
    State(verifier): State<Arc<dyn TokenVerifier>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let principal = authenticate(req.headers(), verifier.as_ref())?;

    // A principal put there by anything else is never trusted
    if req.extensions_mut().insert::<Principal>(principal).is_some() {
        tracing::warn!("replaced a pre-existing principal in request extensions");
    }

    Ok(next.run(req).await)
}
