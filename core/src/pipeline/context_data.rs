// orderflow/src/pipeline/context_data.rs
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Shared, lockable state threaded through every step of a pipeline run.
///
/// A `Mutex` rather than a `RwLock`: step state may own a transaction handle
/// that is `Send` but not `Sync`, and handlers always mutate anyway.
///
/// IMPORTANT: guards are blocking and MUST be dropped before any `.await`.
/// Handler futures are `Send`, so holding a guard across an await point does
/// not compile.
#[derive(Debug)]
pub struct ContextData<T: Send + 'static>(Arc<Mutex<T>>);

impl<T: Send + 'static> ContextData<T> {
  pub fn new(data: T) -> Self {
    ContextData(Arc::new(Mutex::new(data)))
  }

  /// Locks the state. The returned guard MUST be dropped before any `.await`.
  pub fn lock(&self) -> MutexGuard<'_, T> {
    self.0.lock()
  }

  /// Recovers the state once every other clone is gone, e.g. after `run`.
  /// Hands the context back unchanged if it is still shared.
  pub fn into_inner(self) -> Result<T, Self> {
    Arc::try_unwrap(self.0).map(Mutex::into_inner).map_err(ContextData)
  }
}

impl<T: Send + 'static> Clone for ContextData<T> {
  fn clone(&self) -> Self {
    ContextData(Arc::clone(&self.0))
  }
}

impl<T: Send + 'static + Default> Default for ContextData<T> {
  fn default() -> Self {
    Self::new(Default::default())
  }
}
