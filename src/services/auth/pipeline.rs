/*
 * Responsibility
 * - resolver の結果を検証し Principal を作る状態遷移
 *
 *   Start ──resolve──> HaveToken ──verify ok──> Authenticated
 *     │                   │
 *     │ absent / empty    │ expired | malformed | forged
 *     v                   v
 *   Rejected            Rejected
 *
 * Notes
 * - verify は HaveToken からの遷移でだけ、1 回だけ呼ぶ
 * - source 間のフォールバックは resolver の「absent」時のみ。
 *   cookie が存在して検証に失敗したら header は見ない
 */
use axum::http::HeaderMap;

use super::credential::{self, CredentialSource};
use super::error::{CredentialError, VerificationError};
use super::principal::{Claims, Principal};

/// Signature + expiry check over a raw token.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Claims, VerificationError>;
}

#[derive(Debug)]
enum Stage<'a> {
    Start(&'a HeaderMap),
    HaveToken {
        token: String,
        source: CredentialSource,
    },
    Authenticated {
        principal: Principal,
        source: CredentialSource,
    },
    Rejected {
        error: CredentialError,
        source: CredentialSource,
    },
}

impl<'a> Stage<'a> {
    fn advance(self, verifier: &dyn TokenVerifier) -> Stage<'a> {
        match self {
            Stage::Start(headers) => match credential::resolve(headers).into_parts() {
                (Some(token), source) if !token.is_empty() => Stage::HaveToken { token, source },
                (Some(_), source) => Stage::Rejected {
                    error: CredentialError::Malformed,
                    source,
                },
                (None, source) => Stage::Rejected {
                    error: CredentialError::Absent,
                    source,
                },
            },
            Stage::HaveToken { token, source } => {
                match verifier.verify(&token).and_then(Principal::from_claims) {
                    Ok(principal) => Stage::Authenticated { principal, source },
                    Err(e) => Stage::Rejected {
                        error: e.into(),
                        source,
                    },
                }
            }
            terminal => terminal,
        }
    }
}

/// Run the pipeline over a request's headers.
pub fn authenticate(
    headers: &HeaderMap,
    verifier: &dyn TokenVerifier,
) -> Result<Principal, CredentialError> {
    let mut stage = Stage::Start(headers);

    loop {
        stage = match stage {
            Stage::Authenticated { principal, source } => {
                tracing::debug!(
                    subject_id = %principal.subject_id(),
                    source = source.as_str(),
                    "request authenticated"
                );
                return Ok(principal);
            }
            Stage::Rejected { error, source } => {
                tracing::warn!(
                    kind = error.kind(),
                    source = source.as_str(),
                    "request rejected: not logged in"
                );
                return Err(error);
            }
            other => other.advance(verifier),
        };
    }
}
