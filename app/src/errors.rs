// orderflow_app/src/errors.rs

use orderflow::OrderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Order Error: {0}")]
  Order(#[from] OrderError),

  #[error("I/O Error: {0}")]
  Io(#[from] std::io::Error),

  #[error("JSON Error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("Database Error: {0}")]
  Database(#[from] sqlx::Error),
}

impl AppError {
  /// Process exit code for this failure.
  pub fn exit_code(&self) -> i32 {
    match self {
      AppError::Config(_) => 78,
      AppError::Order(e) if e.is_cancelled() => 130,
      AppError::Order(OrderError::InvalidPage { .. } | OrderError::InvalidPageSize { .. }) => 64,
      AppError::Json(_) => 65,
      AppError::Io(_) => 74,
      AppError::Order(_) | AppError::Database(_) => 1,
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
