// orderflow/src/pipeline/step.rs

//! A single named step of a pipeline.

use super::ContextData;
use std::sync::Arc;

/// Predicate evaluated right before a step runs; `true` skips the step.
pub type SkipCondition<TData> = Arc<dyn Fn(&TData) -> bool + Send + Sync + 'static>;

#[derive(Clone)]
pub struct StepDef<TData: Send + 'static> {
  pub name: String,
  pub skip_if: Option<SkipCondition<TData>>,
}

impl<TData: Send + 'static> StepDef<TData> {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      skip_if: None,
    }
  }

  /// Evaluates the skip predicate under a short-lived lock.
  pub(crate) fn should_skip(&self, ctx_data: &ContextData<TData>) -> bool {
    match &self.skip_if {
      Some(cond) => {
        let guard = ctx_data.lock();
        cond(&guard)
      }
      None => false,
    }
  }
}

impl<TData: Send + 'static> std::fmt::Debug for StepDef<TData> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("skip_if_present", &self.skip_if.is_some())
      .finish()
  }
}
