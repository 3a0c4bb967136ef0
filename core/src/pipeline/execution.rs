// bazaar/src/pipeline/execution.rs

//! Contains the `Pipeline::run()` method, responsible for executing the pipeline's steps and handlers.

use crate::core::context::Handler;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::error::BazaarError;
use crate::pipeline::definition::Pipeline;
use std::collections::HashMap;
use tracing::{event, instrument, Instrument, Level};

/// Result of running one phase of a step.
enum PhaseOutcome<T> {
  Continue(T),
  Stopped(T),
}

impl<T, Err> Pipeline<T, Err>
where
  T: 'static + Send,
  Err: std::error::Error + From<BazaarError> + Send + Sync + 'static,
{
  /// Executes the pipeline, threading `ctx` through every handler in order.
  ///
  /// Returns the final context wrapped in `PipelineResult`, or the first error
  /// raised by a handler. A non-optional step with no handlers at all fails with
  /// `BazaarError::HandlerMissing` converted into `Err`.
  #[instrument(
        name = "Pipeline::run",
        skip_all,
        fields(
            pipeline_context_type = %std::any::type_name::<T>(),
            num_steps = self.steps.len(),
        ),
        err(Display)
    )]
  pub async fn run(&self, ctx: T) -> Result<PipelineResult<T>, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");
    let mut ctx = ctx;

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();

      if step_def.should_skip(&ctx) {
        event!(Level::DEBUG, step_name, "Step skipped due to 'skip_if' condition.");
        continue;
      }

      let has_handlers = [&self.before, &self.on, &self.after]
        .iter()
        .any(|phase| phase.get(step_name).is_some_and(|v| !v.is_empty()));

      if !has_handlers {
        if step_def.optional {
          event!(Level::DEBUG, step_name, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(Level::ERROR, step_name, "Non-optional step has no handlers.");
        return Err(Err::from(BazaarError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      let step_span = tracing::info_span!(
        "pipeline_step_execution",
        step_name,
        step_index = step_idx,
        optional = step_def.optional
      );

      let outcome = async {
        let mut current = ctx;
        for (phase_name, phase) in [("before", &self.before), ("on", &self.on), ("after", &self.after)] {
          match Self::run_phase(phase, step_name, phase_name, current).await? {
            PhaseOutcome::Continue(next) => current = next,
            PhaseOutcome::Stopped(last) => return Ok(PhaseOutcome::Stopped(last)),
          }
        }
        Ok::<_, Err>(PhaseOutcome::Continue(current))
      }
      .instrument(step_span)
      .await?;

      match outcome {
        PhaseOutcome::Continue(next) => ctx = next,
        PhaseOutcome::Stopped(last) => {
          event!(Level::INFO, step_name, "Pipeline stopped by a handler.");
          return Ok(PipelineResult::Stopped(last));
        }
      }
      event!(Level::DEBUG, step_name, "Step processing finished successfully.");
    }

    event!(Level::DEBUG, "Pipeline execution completed successfully.");
    Ok(PipelineResult::Completed(ctx))
  }

  async fn run_phase(
    phase: &HashMap<String, Vec<Handler<T, Err>>>,
    step_name: &str,
    phase_name: &'static str,
    ctx: T,
  ) -> Result<PhaseOutcome<T>, Err> {
    let Some(handlers) = phase.get(step_name) else {
      return Ok(PhaseOutcome::Continue(ctx));
    };

    let mut current = ctx;
    for (handler_idx, handler_fn) in handlers.iter().enumerate() {
      match handler_fn(current).await {
        Ok(PipelineControl::Continue(next)) => current = next,
        Ok(PipelineControl::Stop(last)) => {
          event!(Level::DEBUG, phase = phase_name, handler_index = handler_idx, "Handler requested stop.");
          return Ok(PhaseOutcome::Stopped(last));
        }
        Err(e) => {
          event!(Level::DEBUG, phase = phase_name, handler_index = handler_idx, error = %e, "Handler failed.");
          return Err(e);
        }
      }
    }
    Ok(PhaseOutcome::Continue(current))
  }
}
