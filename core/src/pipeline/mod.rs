// orderflow/src/pipeline/mod.rs

pub mod context_data;
pub mod control;
pub mod definition;
pub mod execution;
pub mod hooks;
pub mod step;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use definition::{BoxFuture, FailureHandler, Handler, Pipeline};
pub use step::{SkipCondition, StepDef};
