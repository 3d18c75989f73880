// orderflow/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Failures raised by the pipeline engine itself, independent of what the
/// handlers do.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("Handler missing for step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Pipeline cancelled before step '{step_name}'")]
  Cancelled { step_name: String },
}

/// Failures reported by the store collaborators (transaction scope, order
/// store, item store).
#[derive(Debug, Error)]
pub enum StoreError {
  #[cfg(feature = "postgres")]
  #[error("Database error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Order item references unknown order {order_id}")]
  ForeignKeyViolation { order_id: i64 },

  #[error("Transaction is no longer open")]
  TransactionClosed,

  #[error("Store backend error: {0}")]
  Backend(#[from] AnyhowError),
}

/// Error type returned by `OrderService` operations.
#[derive(Debug, Error)]
pub enum OrderError {
  #[error("Store error: {0}")]
  Store(#[from] StoreError),

  #[error("Pipeline error: {0}")]
  Pipeline(PipelineError),

  #[error("Operation cancelled")]
  Cancelled,

  #[error("Invalid page number {page}: pages start at 1")]
  InvalidPage { page: u32 },

  #[error("Invalid page size {page_size}: must be at least 1")]
  InvalidPageSize { page_size: u32 },

  #[error("Order store broke positional correspondence at index {index}: {detail}")]
  CorrespondenceViolation { index: usize, detail: String },

  #[error("Rollback failed ({source}) while handling: {cause}")]
  RollbackFailed {
    #[source]
    source: StoreError,
    cause: Box<OrderError>,
  },

  #[error("Internal error: {0}")]
  Internal(String),
}

impl From<PipelineError> for OrderError {
  fn from(err: PipelineError) -> Self {
    match err {
      // Cancellation is a caller-visible outcome, not an engine fault.
      PipelineError::Cancelled { .. } => OrderError::Cancelled,
      other => OrderError::Pipeline(other),
    }
  }
}

impl OrderError {
  /// True when this error (or the fault behind a failed rollback) is a cancellation.
  pub fn is_cancelled(&self) -> bool {
    match self {
      OrderError::Cancelled => true,
      OrderError::RollbackFailed { cause, .. } => cause.is_cancelled(),
      _ => false,
    }
  }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
pub type OrderResult<T, E = OrderError> = std::result::Result<T, E>;
