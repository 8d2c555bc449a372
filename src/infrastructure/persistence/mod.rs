mod pg_pool;
mod repositories;

pub use repositories::InMemoryImageRepository;
pub use repositories::InMemoryUserRepository;
pub use repositories::PgImageRepository;
pub use repositories::PgUserRepository;

pub use pg_pool::create_pool;
