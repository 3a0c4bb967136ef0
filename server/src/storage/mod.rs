// bazaar_server/src/storage/mod.rs

//! Storage backend selection.

pub mod postgres;

use bazaar::Repositories;
use sqlx::PgPool;
use tracing::info;

use crate::config::{AppConfig, StorageBackend};
use crate::errors::{AppError, Result};

/// Builds the repository bundle the configured backend provides.
pub async fn connect(config: &AppConfig) -> Result<Repositories> {
  match config.storage_backend {
    StorageBackend::Memory => {
      info!("Using in-memory storage; data does not survive a restart.");
      Ok(Repositories::in_memory())
    }
    StorageBackend::Postgres => {
      let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| AppError::Config("DATABASE_URL is required for the postgres backend".to_string()))?;
      let pool = PgPool::connect(database_url).await?;
      info!("Successfully connected to the database.");

      if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied.");
      }
      Ok(postgres::repositories(pool))
    }
  }
}
