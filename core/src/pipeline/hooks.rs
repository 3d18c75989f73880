// orderflow/src/pipeline/hooks.rs

//! Registration of step handlers and failure compensations.

use tracing::{event, Level};

use crate::error::PipelineError;
use crate::pipeline::context_data::ContextData;
use crate::pipeline::control::PipelineControl;
use crate::pipeline::definition::{FailureHandler, Handler, Pipeline};
use std::future::Future;

impl<TData, Err> Pipeline<TData, Err>
where
  TData: Send + 'static,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Registers a handler for `step_name`. Handlers of one step run in
  /// registration order.
  ///
  /// The handler may fail with any error convertible into the pipeline's `Err`.
  ///
  /// # Panics
  /// If `step_name` is not part of the pipeline.
  pub fn on<F, UserProvidedErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, UserProvidedErr>> + Send + 'static,
    UserProvidedErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let final_handler: Handler<TData, Err> = Box::new(move |ctx_data| {
      let user_fut = handler_fn(ctx_data);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    });
    self.on.entry(step_name.to_string()).or_default().push(final_handler);
    event!(Level::TRACE, pipeline = %self.name, %step_name, "Handler registered.");
  }

  /// Registers a compensation that runs whenever the pipeline fails, after
  /// the failing step and before the error reaches the caller.
  ///
  /// Compensations run in registration order; each receives the error handed
  /// on by the previous one.
  pub fn on_failure<F>(&mut self, handler_fn: impl Fn(ContextData<TData>, Err) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Err> + Send + 'static,
  {
    let final_handler: FailureHandler<TData, Err> = Box::new(move |ctx_data, err| Box::pin(handler_fn(ctx_data, err)));
    self.on_failure.push(final_handler);
  }
}
