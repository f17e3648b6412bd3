/*
 * Responsibility
 * - 署名済みトークンの claims 型
 * - Handler から見える「認証済み主体」(Principal) の型
 *
 * Notes
 * - Principal は検証済み claims からしか作れない (部分的に埋まった Principal は存在しない)
 * - request extensions の `Principal` スロットが唯一の置き場所
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::VerificationError;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated identity attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    subject_id: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Principal {
    /// Build a principal from claims the verifier has already accepted.
    ///
    /// A blank subject or an unrepresentable timestamp is treated as a malformed token.
    pub fn from_claims(claims: Claims) -> Result<Self, VerificationError> {
        if claims.sub.trim().is_empty() {
            return Err(VerificationError::Malformed);
        }

        let issued_at =
            DateTime::from_timestamp(claims.iat, 0).ok_or(VerificationError::Malformed)?;
        let expires_at =
            DateTime::from_timestamp(claims.exp, 0).ok_or(VerificationError::Malformed)?;

        Ok(Self {
            subject_id: claims.sub,
            issued_at,
            expires_at,
        })
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}
