pub mod auth;
pub mod authz;
pub mod id_codec;
pub mod media;
pub mod password;
