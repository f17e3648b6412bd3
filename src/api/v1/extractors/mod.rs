pub mod auth_ctx;
pub mod public_id;

pub use auth_ctx::CurrentPrincipal;
