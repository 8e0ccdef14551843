pub mod prize_service;
pub mod user_service;
pub mod winner_service;

pub use prize_service::*;
pub use user_service::*;
pub use winner_service::*;

/// In-memory SQLite pool for service tests. A single connection keeps the
/// shared memory database alive across queries.
#[cfg(test)]
pub(crate) async fn test_pool() -> sea_orm::DatabaseConnection {
    use migration::{Migrator, MigratorTrait};

    let mut options = sea_orm::ConnectOptions::new("sqlite::memory:".to_owned());
    options.max_connections(1);
    let pool = sea_orm::Database::connect(options)
        .await
        .expect("failed to open in-memory database");
    Migrator::up(&pool, None)
        .await
        .expect("failed to run migrations");
    pool
}
