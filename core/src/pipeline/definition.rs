// core/src/pipeline/definition.rs

//! The `Pipeline<TData, Err>` type and its structural editing methods.

use crate::core::context::Handler;
use crate::core::step::{Phase, SkipCondition, StepDef};
use crate::error::FlowError;
use std::collections::HashMap;

/// Handlers attached to one step, grouped by phase.
pub(crate) struct StepHandlers<TData, Err>
where
  TData: Send + Sync + 'static,
{
  pub(crate) before: Vec<Handler<TData, Err>>,
  pub(crate) on: Vec<Handler<TData, Err>>,
  pub(crate) after: Vec<Handler<TData, Err>>,
}

impl<TData, Err> Default for StepHandlers<TData, Err>
where
  TData: Send + Sync + 'static,
{
  fn default() -> Self {
    Self {
      before: Vec::new(),
      on: Vec::new(),
      after: Vec::new(),
    }
  }
}

impl<TData, Err> StepHandlers<TData, Err>
where
  TData: Send + Sync + 'static,
{
  pub(crate) fn phase(&self, phase: Phase) -> &[Handler<TData, Err>] {
    match phase {
      Phase::Before => &self.before,
      Phase::On => &self.on,
      Phase::After => &self.after,
    }
  }

  pub(crate) fn phase_mut(&mut self, phase: Phase) -> &mut Vec<Handler<TData, Err>> {
    match phase {
      Phase::Before => &mut self.before,
      Phase::On => &mut self.on,
      Phase::After => &mut self.after,
    }
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.before.is_empty() && self.on.is_empty() && self.after.is_empty()
  }
}

/// An ordered list of named steps over the context data type `TData`.
///
/// `Err` is what handlers (and the run) fail with. It must absorb engine errors
/// through `From<FlowError>` so that a misconfigured step surfaces through the
/// same channel as a business failure.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) handlers: HashMap<String, StepHandlers<TData, Err>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Creates a pipeline from `(name, optional, skip_if)` triples.
  ///
  /// Later duplicates of a step name are ignored; step names are unique keys.
  pub fn new(step_defs: &[(&str, bool, Option<SkipCondition<TData>>)]) -> Self {
    let mut steps: Vec<StepDef<TData>> = Vec::with_capacity(step_defs.len());
    for (name, optional, skip_if) in step_defs {
      if steps.iter().all(|s| s.name != *name) {
        steps.push(StepDef::new(*name, *optional, skip_if.clone()));
      }
    }
    Self {
      steps,
      handlers: HashMap::new(),
    }
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  fn position(&self, step_name: &str) -> Result<usize, FlowError> {
    self
      .steps
      .iter()
      .position(|s| s.name == step_name)
      .ok_or_else(|| FlowError::StepNotFound {
        step_name: step_name.to_string(),
      })
  }

  pub(crate) fn step_mut(&mut self, step_name: &str) -> Result<&mut StepDef<TData>, FlowError> {
    let idx = self.position(step_name)?;
    Ok(&mut self.steps[idx])
  }

  fn insert_at(&mut self, idx: usize, step: StepDef<TData>) -> Result<(), FlowError> {
    if self.steps.iter().any(|s| s.name == step.name) {
      return Err(FlowError::DuplicateStep { step_name: step.name });
    }
    self.steps.insert(idx, step);
    Ok(())
  }

  pub fn insert_before(
    &mut self,
    existing_step: &str,
    new_step: impl Into<String>,
    optional: bool,
    skip_if: Option<SkipCondition<TData>>,
  ) -> Result<(), FlowError> {
    let idx = self.position(existing_step)?;
    self.insert_at(idx, StepDef::new(new_step, optional, skip_if))
  }

  pub fn insert_after(
    &mut self,
    existing_step: &str,
    new_step: impl Into<String>,
    optional: bool,
    skip_if: Option<SkipCondition<TData>>,
  ) -> Result<(), FlowError> {
    let idx = self.position(existing_step)?;
    self.insert_at(idx + 1, StepDef::new(new_step, optional, skip_if))
  }

  /// Removes a step together with all of its handlers.
  pub fn remove_step(&mut self, step_name: &str) -> Result<(), FlowError> {
    let idx = self.position(step_name)?;
    self.steps.remove(idx);
    self.handlers.remove(step_name);
    Ok(())
  }

  pub fn set_optional(&mut self, step_name: &str, optional: bool) -> Result<(), FlowError> {
    self.step_mut(step_name)?.optional = optional;
    Ok(())
  }

  pub fn set_skip_condition(
    &mut self,
    step_name: &str,
    skip_if: Option<SkipCondition<TData>>,
  ) -> Result<(), FlowError> {
    self.step_mut(step_name)?.skip_if = skip_if;
    Ok(())
  }

  /// Number of handlers registered for `phase` of `step_name`.
  pub fn handler_count(&self, step_name: &str, phase: Phase) -> usize {
    self.handlers.get(step_name).map_or(0, |h| h.phase(phase).len())
  }
}
