// bazaar/src/core/mod.rs

pub mod context;
pub mod control;
pub mod step;

pub use context::{Handler, HandlerFuture};
pub use control::{PipelineControl, PipelineResult};
pub use step::{SkipCondition, StepDef};
