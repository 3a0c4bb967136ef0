// bazaar/src/pipeline/definition.rs

//! Contains the `Pipeline<T, Err>` struct definition and methods for its
//! construction and structural modification.

use crate::core::context::Handler;
use crate::core::step::{SkipCondition, StepDef};
use crate::error::BazaarError;
use std::collections::HashMap;

/// An ordered list of named steps, each with `before`/`on`/`after` handlers,
/// generic over a context type `T` and the error type `Err` its handlers return.
///
/// `Err` must be `From<BazaarError>` so framework failures (a non-optional step
/// without handlers, for instance) surface through the pipeline's own error type.
pub struct Pipeline<T, Err>
where
  T: 'static + Send,
  Err: std::error::Error + From<BazaarError> + Send + Sync + 'static,
{
  /// Ordered list of step definitions for this pipeline.
  pub(crate) steps: Vec<StepDef<T>>,

  pub(crate) before: HashMap<String, Vec<Handler<T, Err>>>,
  pub(crate) on: HashMap<String, Vec<Handler<T, Err>>>,
  pub(crate) after: HashMap<String, Vec<Handler<T, Err>>>,
}

impl<T, Err> Pipeline<T, Err>
where
  T: 'static + Send,
  Err: std::error::Error + From<BazaarError> + Send + Sync + 'static,
{
  /// Creates a new `Pipeline` with an initial set of step definitions.
  pub fn new(step_defs: &[(&str, bool, Option<SkipCondition<T>>)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(name, optional, skip_if)| StepDef::new(*name, *optional, skip_if.clone()))
      .collect();

    Self {
      steps,
      before: HashMap::new(),
      on: HashMap::new(),
      after: HashMap::new(),
    }
  }

  pub fn step_names(&self) -> impl Iterator<Item = &str> {
    self.steps.iter().map(|s| s.name.as_str())
  }

  /// Ensures that a step with the given name exists in the pipeline. Panics if not found.
  /// A missing step here is a typo in the wiring code, not a runtime condition.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!("Bazaar setup error: Step '{}' not found in pipeline definition.", step_name);
    }
  }

  fn ensure_step_not_exists(&self, step_name: &str) {
    if self.steps.iter().any(|s| s.name == step_name) {
      panic!("Bazaar setup error: Step '{}' already exists in pipeline definition.", step_name);
    }
  }

  pub fn insert_after_step<S: Into<String>>(
    &mut self,
    existing_step_name: &str,
    new_step_name: S,
    optional: bool,
    skip_if: Option<SkipCondition<T>>,
  ) {
    self.ensure_step_exists(existing_step_name);
    let name: String = new_step_name.into();
    self.ensure_step_not_exists(&name);
    let idx = self
      .steps
      .iter()
      .position(|s| s.name == existing_step_name)
      .map_or(self.steps.len(), |i| i + 1);
    self.steps.insert(idx, StepDef::new(name, optional, skip_if));
  }
}
