/*
 * Responsibility
 * - Principal を消費する認可判定 (owner-only mutation)
 * - 判定は毎回計算し、保存しない
 *
 * Notes
 * - Deny は必ず `enforce()` で AppError::Forbidden にして handler を止める
 */
use crate::error::AppError;
use crate::services::auth::Principal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a Decision must be enforced before mutating"]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn enforce(self) -> Result<(), AppError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(DenyReason::Forbidden) => Err(AppError::Forbidden),
        }
    }
}

/// Only the resource owner may proceed.
pub fn owner_only(principal: &Principal, owner_id: &str) -> Decision {
    if principal.subject_id() == owner_id {
        Decision::Allow
    } else {
        tracing::warn!(
            subject_id = %principal.subject_id(),
            owner_id = %owner_id,
            "owner-only action denied"
        );
        Decision::Deny(DenyReason::Forbidden)
    }
}
