// bazaar/src/pipeline/hooks.rs

//! Methods for registering `before`, `on`, and `after` handlers for pipeline steps.

use crate::core::context::Handler;
use crate::core::control::PipelineControl;
use crate::error::BazaarError;
use crate::pipeline::definition::Pipeline;
use std::future::Future;
use tracing::{event, Level};

impl<T, Err> Pipeline<T, Err>
where
  T: 'static + Send,
  Err: std::error::Error + From<BazaarError> + Send + Sync + 'static,
{
  /// Wraps a user handler so its own error type converts into the pipeline's `Err`.
  fn box_handler<F, UserErr>(handler_fn: impl Fn(T) -> F + Send + Sync + 'static) -> Handler<T, Err>
  where
    F: Future<Output = Result<PipelineControl<T>, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    Box::new(move |ctx| {
      let user_fut = handler_fn(ctx);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    })
  }

  /// Registers a `before` hook for a given step.
  pub fn before_root<F, UserErr>(&mut self, step_name: &str, handler_fn: impl Fn(T) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl<T>, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    self
      .before
      .entry(step_name.to_string())
      .or_default()
      .push(Self::box_handler(handler_fn));
    event!(Level::TRACE, %step_name, "'before' handler registered.");
  }

  /// Registers an `on` hook for a given step.
  pub fn on_root<F, UserErr>(&mut self, step_name: &str, handler_fn: impl Fn(T) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl<T>, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    self
      .on
      .entry(step_name.to_string())
      .or_default()
      .push(Self::box_handler(handler_fn));
    event!(Level::TRACE, %step_name, "'on' handler registered.");
  }

  /// Registers an `after` hook for a given step.
  pub fn after_root<F, UserErr>(&mut self, step_name: &str, handler_fn: impl Fn(T) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl<T>, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    self
      .after
      .entry(step_name.to_string())
      .or_default()
      .push(Self::box_handler(handler_fn));
    event!(Level::TRACE, %step_name, "'after' handler registered.");
  }
}
