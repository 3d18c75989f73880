// orderflow/src/pipeline/definition.rs

//! Contains the `Pipeline<TData, Err>` struct definition and methods for its
//! construction.

use crate::error::PipelineError;
use crate::pipeline::context_data::ContextData;
use crate::pipeline::control::PipelineControl;
use crate::pipeline::step::{SkipCondition, StepDef};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// A step handler: takes a clone of the shared context and resolves to a
/// control signal or the pipeline's error type.
///
/// Handlers must drop every lock guard before their first `.await`.
pub type Handler<TData, Err> =
  Box<dyn Fn(ContextData<TData>) -> BoxFuture<Result<PipelineControl, Err>> + Send + Sync>;

/// A compensation run when the pipeline fails. It receives the error that
/// ended the run and resolves to the error the caller will see, which lets
/// it keep the original fault or wrap it with its own failure.
pub type FailureHandler<TData, Err> = Box<dyn Fn(ContextData<TData>, Err) -> BoxFuture<Err> + Send + Sync>;

/// An ordered list of named steps over shared state `TData`, failing with `Err`.
///
/// `Err` must be `From<PipelineError>` so engine-level faults (cancellation,
/// missing handlers) surface through the same type as handler failures.
pub struct Pipeline<TData, Err>
where
  TData: Send + 'static,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Label used in tracing spans.
  pub(crate) name: String,
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) on_failure: Vec<FailureHandler<TData, Err>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: Send + 'static,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Creates a pipeline with the given steps, in execution order.
  ///
  /// # Panics
  /// If a step name appears twice.
  pub fn new(name: impl Into<String>, step_names: &[&str]) -> Self {
    let mut pipeline = Self {
      name: name.into(),
      steps: Vec::with_capacity(step_names.len()),
      on: HashMap::new(),
      on_failure: Vec::new(),
    };
    for step_name in step_names {
      pipeline.ensure_step_not_exists(step_name);
      pipeline.steps.push(StepDef::new(*step_name));
    }
    pipeline
  }

  /// Panics if the step is unknown. A typo in a step name is a setup bug, not
  /// a runtime condition.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!(
        "Pipeline '{}' setup error: step '{}' not found in pipeline definition.",
        self.name, step_name
      );
    }
  }

  fn ensure_step_not_exists(&self, step_name: &str) {
    if self.steps.iter().any(|s| s.name == step_name) {
      panic!(
        "Pipeline '{}' setup error: step '{}' already exists in pipeline definition.",
        self.name, step_name
      );
    }
  }

  /// Skips `step_name` whenever `cond` holds for the state at that point of the run.
  pub fn set_skip_condition(&mut self, step_name: &str, cond: impl Fn(&TData) -> bool + Send + Sync + 'static) {
    self.ensure_step_exists(step_name);
    let skip_if: SkipCondition<TData> = Arc::new(cond);
    if let Some(step) = self.steps.iter_mut().find(|s| s.name == step_name) {
      step.skip_if = Some(skip_if);
    }
  }
}
