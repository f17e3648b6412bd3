/*
 * Responsibility
 * - request identity pipeline: credential resolver → verifier → Principal
 * - token issuance (署名) と Set-Cookie の組み立て
 */
pub mod access_jwt;
pub mod cookie;
pub mod credential;
pub mod error;
pub mod factory;
pub mod pipeline;
pub mod principal;

pub use access_jwt::{AuthService, IssuedToken, TOKEN_TTL_SECONDS};
pub use cookie::CookiePolicy;
pub use credential::{CredentialSource, ResolvedCredential, TOKEN_COOKIE, TOKEN_HEADER};
pub use error::{CredentialError, VerificationError};
pub use factory::{build_auth_service, build_cookie_policy};
pub use pipeline::{TokenVerifier, authenticate};
pub use principal::{Claims, Principal};
