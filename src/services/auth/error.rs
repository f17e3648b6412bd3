use thiserror::Error;

/// Failure reported by the signing primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("token expired")]
    Expired,
    #[error("token malformed")]
    Malformed,
    #[error("token signature invalid")]
    Forged,
}

/// Why a request could not be authenticated.
///
/// All variants produce the same client-facing response; the kind is only
/// visible in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("credential absent")]
    Absent,
    #[error("credential malformed")]
    Malformed,
    #[error("credential expired")]
    Expired,
    #[error("credential forged")]
    Forged,
}

impl CredentialError {
    pub fn kind(&self) -> &'static str {
        match self {
            CredentialError::Absent => "absent",
            CredentialError::Malformed => "malformed",
            CredentialError::Expired => "expired",
            CredentialError::Forged => "forged",
        }
    }
}

impl From<VerificationError> for CredentialError {
    fn from(e: VerificationError) -> Self {
        match e {
            VerificationError::Expired => CredentialError::Expired,
            VerificationError::Malformed => CredentialError::Malformed,
            VerificationError::Forged => CredentialError::Forged,
        }
    }
}
