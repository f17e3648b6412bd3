use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};

use crate::error::AppError;
use crate::services::auth::error::VerificationError;
use crate::services::auth::pipeline::TokenVerifier;
use crate::services::auth::principal::Claims;

/// Lifetime of an issued token: 48 hours.
pub const TOKEN_TTL_SECONDS: i64 = 48 * 60 * 60;

/// A freshly signed token together with the window it is valid for.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// HS256 token signer/verifier.
///
/// - Key material is intentionally not printable via Debug.
/// - The key is process-wide and read-only after start-up.
#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("AuthService")
            .field("validation", &self.validation)
            .finish()
    }
}

impl AuthService {
    pub fn new(secret: &[u8], leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.leeway = leeway_seconds;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign arbitrary claims.
    pub fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "failed to sign token");
            AppError::Internal
        })
    }

    /// Issue a token for `subject_id`, valid for [`TOKEN_TTL_SECONDS`] from `now`.
    ///
    /// Pure in `(subject_id, now, key)`: no clock is read here.
    pub fn issue(&self, subject_id: &str, now: DateTime<Utc>) -> Result<IssuedToken, AppError> {
        if subject_id.trim().is_empty() {
            tracing::error!("refusing to issue a token without subject");
            return Err(AppError::Internal);
        }

        // Truncate to whole seconds so the returned window matches the claims exactly.
        let issued_at = DateTime::from_timestamp(now.timestamp(), 0).ok_or(AppError::Internal)?;
        let expires_at = issued_at + Duration::seconds(TOKEN_TTL_SECONDS);

        let claims = Claims {
            sub: subject_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        Ok(IssuedToken {
            token: self.sign(&claims)?,
            issued_at,
            expires_at,
        })
    }
}

impl TokenVerifier for AuthService {
    fn verify(&self, token: &str) -> Result<Claims, VerificationError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| classify(e.kind()))
    }
}

fn classify(kind: &ErrorKind) -> VerificationError {
    match kind {
        ErrorKind::ExpiredSignature => VerificationError::Expired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => VerificationError::Forged,
        _ => VerificationError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"0123456789abcdef0123456789abcdef";
    const OTHER_KEY: &[u8] = b"fedcba9876543210fedcba9876543210";

    fn service() -> AuthService {
        AuthService::new(KEY, 0)
    }

    #[test]
    fn sign_then_verify_returns_the_same_claims() {
        let svc = service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "u1".into(),
            iat: now,
            exp: now + 120,
        };

        let token = svc.sign(&claims).unwrap();
        assert_eq!(svc.verify(&token).unwrap(), claims);
    }

    #[test]
    fn issued_window_is_48_hours() {
        let svc = service();
        let issued = svc.issue("u1", Utc::now()).unwrap();
        let claims = svc.verify(&issued.token).unwrap();

        assert_eq!(claims.exp - claims.iat, 172_800);
        assert_eq!(claims.iat, issued.issued_at.timestamp());
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn issuance_is_deterministic_for_fixed_inputs() {
        let svc = service();
        let now = Utc::now();
        assert_eq!(
            svc.issue("u1", now).unwrap().token,
            svc.issue("u1", now).unwrap().token
        );
    }

    #[test]
    fn token_issued_49_hours_ago_is_expired() {
        let svc = service();
        let issued = svc
            .issue("u1", Utc::now() - Duration::hours(49))
            .unwrap();

        assert_eq!(svc.verify(&issued.token), Err(VerificationError::Expired));
    }

    #[test]
    fn token_from_another_key_is_forged() {
        let other = AuthService::new(OTHER_KEY, 0);
        let issued = other.issue("u1", Utc::now()).unwrap();

        assert_eq!(service().verify(&issued.token), Err(VerificationError::Forged));
    }

    #[test]
    fn tampered_payload_is_forged() {
        let svc = service();
        let good = svc.issue("u1", Utc::now()).unwrap().token;
        let evil = svc.issue("u2", Utc::now()).unwrap().token;

        let good_parts: Vec<&str> = good.split('.').collect();
        let evil_parts: Vec<&str> = evil.split('.').collect();
        let spliced = format!("{}.{}.{}", good_parts[0], evil_parts[1], good_parts[2]);

        assert_eq!(svc.verify(&spliced), Err(VerificationError::Forged));
    }

    #[test]
    fn other_algorithm_is_forged() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "u1".into(),
            iat: now,
            exp: now + 60,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(KEY),
        )
        .unwrap();

        assert_eq!(service().verify(&token), Err(VerificationError::Forged));
    }

    #[test]
    fn garbage_is_malformed() {
        let svc = service();
        for token in ["", "abc", "a.b.c", "not a token at all"] {
            assert_eq!(svc.verify(token), Err(VerificationError::Malformed), "{token:?}");
        }
    }

    #[test]
    fn truncated_token_is_malformed() {
        let svc = service();
        let token = svc.issue("u1", Utc::now()).unwrap().token;
        let (head, _) = token.rsplit_once('.').unwrap();

        assert_eq!(svc.verify(head), Err(VerificationError::Malformed));
    }

    #[test]
    fn verifying_twice_gives_the_same_claims() {
        let svc = service();
        let token = svc.issue("u1", Utc::now()).unwrap().token;

        assert_eq!(svc.verify(&token).unwrap(), svc.verify(&token).unwrap());
    }

    #[test]
    fn debug_does_not_leak_key() {
        let printed = format!("{:?}", service());
        assert!(!printed.contains("0123456789abcdef"));
    }
}
