// bazaar_server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Where entities are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
  Postgres,
  /// Process-local tables. Everything is lost on restart.
  Memory,
}

impl FromStr for StorageBackend {
  type Err = AppError;

  fn from_str(value: &str) -> Result<Self> {
    match value.trim().to_ascii_lowercase().as_str() {
      "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
      "memory" => Ok(StorageBackend::Memory),
      other => Err(AppError::Config(format!(
        "Invalid STORAGE_BACKEND '{}': expected 'postgres' or 'memory'",
        other
      ))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub storage_backend: StorageBackend,
  /// Required for the postgres backend, ignored otherwise.
  pub database_url: Option<String>,
  pub run_migrations: bool,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let storage_backend = get_env("STORAGE_BACKEND")
      .unwrap_or_else(|_| "postgres".to_string())
      .parse::<StorageBackend>()?;

    let database_url = match storage_backend {
      StorageBackend::Postgres => Some(get_env("DATABASE_URL")?),
      StorageBackend::Memory => get_env("DATABASE_URL").ok(),
    };

    let run_migrations = get_env("RUN_MIGRATIONS")
      .unwrap_or_else(|_| "false".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid RUN_MIGRATIONS value: {}", e)))?;

    tracing::info!(backend = ?storage_backend, "Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      storage_backend,
      database_url,
      run_migrations,
    })
  }

  /// In-memory configuration for tests and local experiments.
  pub fn in_memory() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      storage_backend: StorageBackend::Memory,
      database_url: None,
      run_migrations: false,
    }
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}
