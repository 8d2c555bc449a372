mod in_memory_repository;
mod pg_image_repository;
mod pg_user_repository;

pub use in_memory_repository::{InMemoryImageRepository, InMemoryUserRepository};
pub use pg_image_repository::PgImageRepository;
pub use pg_user_repository::PgUserRepository;
