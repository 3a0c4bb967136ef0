// bazaar/src/core/control.rs

//! Defines signals for controlling pipeline flow and the outcome of a pipeline run.
//!
//! The context travels by value: every signal hands it back to the pipeline.

/// Signal from a handler indicating whether the pipeline should continue or stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineControl<T> {
  /// Continue with the remaining handlers of this step and the steps after it.
  Continue(T),
  /// Halt the pipeline immediately. No further handlers run.
  Stop(T),
}

impl<T> PipelineControl<T> {
  pub fn into_inner(self) -> T {
    match self {
      PipelineControl::Continue(ctx) | PipelineControl::Stop(ctx) => ctx,
    }
  }
}

/// Outcome of a full pipeline execution, carrying the final context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineResult<T> {
  /// The pipeline executed all its non-skipped steps to completion.
  Completed(T),
  /// The pipeline was explicitly stopped by a handler returning `PipelineControl::Stop`.
  Stopped(T),
}

impl<T> PipelineResult<T> {
  pub fn is_completed(&self) -> bool {
    matches!(self, PipelineResult::Completed(_))
  }

  pub fn into_inner(self) -> T {
    match self {
      PipelineResult::Completed(ctx) | PipelineResult::Stopped(ctx) => ctx,
    }
  }
}
