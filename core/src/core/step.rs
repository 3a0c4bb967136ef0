// bazaar/src/core/step.rs

//! Defines the structure for a single step within a pipeline.

use std::sync::Arc;

/// Predicate evaluated before a step runs. If it returns true, the step is skipped.
pub type SkipCondition<T> = Arc<dyn Fn(&T) -> bool + Send + Sync + 'static>;

/// Definition of a pipeline step, including its name, optionality, and skip condition.
#[derive(Clone)]
pub struct StepDef<T: 'static + Send> {
  pub name: String,
  pub optional: bool,
  pub skip_if: Option<SkipCondition<T>>,
}

impl<T: 'static + Send> StepDef<T> {
  pub fn new(name: impl Into<String>, optional: bool, skip_if: Option<SkipCondition<T>>) -> Self {
    Self {
      name: name.into(),
      optional,
      skip_if,
    }
  }

  pub(crate) fn should_skip(&self, ctx: &T) -> bool {
    self.skip_if.as_ref().is_some_and(|cond| cond(ctx))
  }
}

// SkipCondition is a closure, so Debug only reports whether one is present.
impl<T: 'static + Send> std::fmt::Debug for StepDef<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("optional", &self.optional)
      .field("skip_if_present", &self.skip_if.is_some())
      .finish()
  }
}
