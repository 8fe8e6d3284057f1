//! SQLite Persistence - 连接池、迁移与仓储实现

mod audiobook_repo;
mod database;
mod image_repo;

pub use audiobook_repo::SqliteAudiobookRepository;
pub use database::{create_pool, run_migrations, DatabaseConfig, DbPool};
pub use image_repo::SqliteGeneratedImageRepository;
