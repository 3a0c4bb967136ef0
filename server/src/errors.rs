// bazaar_server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use bazaar::BazaarError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration Error: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("{source}")]
  Marketplace {
    #[from]
    source: BazaarError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<BazaarError>() {
      Ok(source) => AppError::Marketplace { source },
      Err(err) => match err.downcast::<sqlx::Error>() {
        Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
        Err(other) => AppError::Internal(other.to_string()),
      },
    }
  }
}

fn marketplace_status(source: &BazaarError) -> StatusCode {
  match source {
    BazaarError::NotFound { .. } => StatusCode::NOT_FOUND,
    BazaarError::Unauthorized => StatusCode::UNAUTHORIZED,
    BazaarError::Forbidden { .. } => StatusCode::FORBIDDEN,
    BazaarError::DomainState(_) => StatusCode::BAD_REQUEST,
    BazaarError::InvariantViolation { .. }
    | BazaarError::Storage { .. }
    | BazaarError::HandlerMissing { .. }
    | BazaarError::Configuration { .. }
    | BazaarError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Marketplace { source } => marketplace_status(source),
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Migration(_) | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Rejecting request");
    }

    let body = match self {
      AppError::Config(m) => json!({"error": "Configuration issue", "detail": m}),
      AppError::Sqlx(_) | AppError::Migration(_) => json!({"error": "Database operation failed"}),
      AppError::Internal(m) => json!({"error": "An internal error occurred", "detail": m}),
      AppError::Marketplace { source } if status.is_server_error() => {
        tracing::error!(bazaar_error_source = ?source, "Marketplace error details");
        json!({"error": "An internal error occurred", "detail": source.to_string()})
      }
      other => json!({"error": other.to_string()}),
    };
    HttpResponse::build(status).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
