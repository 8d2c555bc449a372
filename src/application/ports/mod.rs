mod image_repository;
mod image_store;
mod password_hasher;
mod repository_error;
mod session_codec;
mod user_repository;
mod vision_client;

pub use image_repository::ImageRepository;
pub use image_store::{ImageStore, ImageStoreError};
pub use password_hasher::{PasswordHashError, PasswordHasher};
pub use repository_error::RepositoryError;
pub use session_codec::SessionCodec;
pub use user_repository::UserRepository;
pub use vision_client::{VisionClient, VisionClientError, VisionTokenStream};
