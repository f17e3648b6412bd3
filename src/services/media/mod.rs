pub mod local;
pub mod store;

pub use local::LocalMediaStore;
pub use store::{MAX_POST_IMAGES, MediaError, MediaKey, MediaResult, MediaStore};
