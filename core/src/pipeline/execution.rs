// orderflow/src/pipeline/execution.rs

//! Contains `Pipeline::run()`, which walks the steps, honours skip conditions
//! and cancellation, and hands failures to the registered compensations.

use crate::error::PipelineError;
use crate::pipeline::context_data::ContextData;
use crate::pipeline::control::{PipelineControl, PipelineResult};
use crate::pipeline::definition::Pipeline;
use crate::pipeline::step::StepDef;
use tokio_util::sync::CancellationToken;
use tracing::{event, instrument, span, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: Send + 'static,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Executes the pipeline against `ctx_data`.
  ///
  /// `cancel` is checked before every step; handlers that await I/O are
  /// expected to race it as well. Any failure, including cancellation, runs
  /// the `on_failure` compensations before the resulting error is returned.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(pipeline = %self.name, num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>, cancel: &CancellationToken) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    match self.run_steps(&ctx_data, cancel).await {
      Ok(result) => {
        event!(Level::DEBUG, ?result, "Pipeline execution finished.");
        Ok(result)
      }
      Err(err) => Err(self.compensate(ctx_data, err).await),
    }
  }

  async fn run_steps(&self, ctx_data: &ContextData<TData>, cancel: &CancellationToken) -> Result<PipelineResult, Err> {
    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_span = span!(
        Level::INFO,
        "pipeline_step",
        step_name = step_def.name.as_str(),
        step_index = step_idx
      );

      match self.run_step(step_def, ctx_data, cancel).instrument(step_span).await? {
        PipelineControl::Continue => {}
        PipelineControl::Stop => return Ok(PipelineResult::Stopped),
      }
    }
    Ok(PipelineResult::Completed)
  }

  async fn run_step(
    &self,
    step_def: &StepDef<TData>,
    ctx_data: &ContextData<TData>,
    cancel: &CancellationToken,
  ) -> Result<PipelineControl, Err> {
    if cancel.is_cancelled() {
      event!(Level::WARN, "Cancellation observed before step.");
      return Err(Err::from(PipelineError::Cancelled {
        step_name: step_def.name.clone(),
      }));
    }

    if step_def.should_skip(ctx_data) {
      event!(Level::INFO, "Step skipped due to 'skip_if' condition.");
      return Ok(PipelineControl::Continue);
    }

    let handlers = match self.on.get(&step_def.name) {
      Some(handlers) if !handlers.is_empty() => handlers,
      _ => {
        event!(Level::ERROR, "Step has no handlers.");
        return Err(Err::from(PipelineError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }
    };

    for (handler_idx, handler_fn) in handlers.iter().enumerate() {
      match handler_fn(ctx_data.clone()).await {
        Ok(PipelineControl::Continue) => {}
        Ok(PipelineControl::Stop) => {
          event!(Level::INFO, handler_index = handler_idx, "Pipeline stopped by a handler.");
          return Ok(PipelineControl::Stop);
        }
        Err(e) => {
          event!(Level::ERROR, handler_index = handler_idx, error = %e, "Handler failed.");
          return Err(e);
        }
      }
    }

    event!(Level::DEBUG, "Step processing finished successfully.");
    Ok(PipelineControl::Continue)
  }

  async fn compensate(&self, ctx_data: ContextData<TData>, err: Err) -> Err {
    let mut err = err;
    for (handler_idx, handler_fn) in self.on_failure.iter().enumerate() {
      let span = span!(Level::INFO, "failure_handler", handler_index = handler_idx);
      err = handler_fn(ctx_data.clone(), err).instrument(span).await;
    }
    err
  }
}
