// orderflow/src/service/cancel.rs

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{OrderError, OrderResult};

/// Awaits `fut` unless `cancel` fires first, in which case `fut` is dropped
/// and the call fails with `OrderError::Cancelled`.
pub(crate) async fn cancellable<T, E, F>(cancel: &CancellationToken, fut: F) -> OrderResult<T>
where
  F: Future<Output = Result<T, E>>,
  E: Into<OrderError>,
{
  tokio::select! {
    biased;
    _ = cancel.cancelled() => Err(OrderError::Cancelled),
    res = fut => res.map_err(Into::into),
  }
}
