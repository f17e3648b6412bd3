pub mod auth;
mod common;
pub mod health;
pub mod posts;
pub mod users;
