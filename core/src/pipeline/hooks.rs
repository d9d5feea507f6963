// core/src/pipeline/hooks.rs

//! Registration of `before` / `on` / `after` handlers.

use crate::core::context::{Handler, HandlerFuture};
use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use crate::core::step::Phase;
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use std::future::Future;
use tracing::{event, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Attaches `handler_fn` to `phase` of `step_name`.
  ///
  /// The handler may fail with any error convertible into the pipeline's `Err`,
  /// which lets shared steps return `FlowError` or `anyhow`-backed types.
  pub fn add_handler<F, HandlerErr>(
    &mut self,
    step_name: &str,
    phase: Phase,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> Result<(), FlowError>
  where
    F: Future<Output = Result<PipelineControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.step_mut(step_name)?;
    let handler: Handler<TData, Err> = Box::new(move |ctx_data: ContextData<TData>| -> HandlerFuture<Err> {
      let fut = handler_fn(ctx_data);
      Box::pin(async move { fut.await.map_err(Into::into) })
    });
    self
      .handlers
      .entry(step_name.to_string())
      .or_default()
      .phase_mut(phase)
      .push(handler);
    event!(Level::TRACE, %step_name, %phase, "Handler registered.");
    Ok(())
  }

  pub fn before_step<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> Result<(), FlowError>
  where
    F: Future<Output = Result<PipelineControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.add_handler(step_name, Phase::Before, handler_fn)
  }

  pub fn on_step<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> Result<(), FlowError>
  where
    F: Future<Output = Result<PipelineControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.add_handler(step_name, Phase::On, handler_fn)
  }

  pub fn after_step<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> Result<(), FlowError>
  where
    F: Future<Output = Result<PipelineControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.add_handler(step_name, Phase::After, handler_fn)
  }
}
