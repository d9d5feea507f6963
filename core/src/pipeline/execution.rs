// core/src/pipeline/execution.rs

//! `Pipeline::run`: walks the steps and drives their handlers.

use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::core::step::Phase;
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use std::time::Instant;
use tracing::{event, instrument, Instrument, Level};

/// What a single step produced.
enum StepOutcome {
  Ran,
  Skipped,
  Stopped,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step against `ctx_data`.
  ///
  /// The first handler error aborts the run and is returned unchanged; a
  /// non-optional step without handlers fails with `FlowError::HandlerMissing`
  /// converted into `Err`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(context_type = %std::any::type_name::<TData>(), num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline run starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_span = tracing::info_span!(
        "pipeline_step",
        step_name = step_def.name.as_str(),
        step_index = step_idx,
        optional = step_def.optional
      );
      let started = Instant::now();
      let outcome = self.run_step(step_idx, ctx_data.clone()).instrument(step_span.clone()).await?;
      let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

      match outcome {
        StepOutcome::Ran => {
          event!(parent: &step_span, Level::DEBUG, elapsed_ms, "Step finished.");
        }
        StepOutcome::Skipped => {
          event!(parent: &step_span, Level::DEBUG, "Step skipped.");
        }
        StepOutcome::Stopped => {
          event!(parent: &step_span, Level::INFO, elapsed_ms, "Pipeline stopped by a handler.");
          return Ok(PipelineResult::Stopped);
        }
      }
    }

    event!(Level::DEBUG, "Pipeline run completed.");
    Ok(PipelineResult::Completed)
  }

  async fn run_step(&self, step_idx: usize, ctx_data: ContextData<TData>) -> Result<StepOutcome, Err> {
    let step_def = &self.steps[step_idx];

    if let Some(skip_if) = &step_def.skip_if {
      if skip_if(ctx_data.clone()) {
        return Ok(StepOutcome::Skipped);
      }
    }

    let handlers = match self.handlers.get(&step_def.name) {
      Some(h) if !h.is_empty() => h,
      _ if step_def.optional => return Ok(StepOutcome::Skipped),
      _ => {
        event!(Level::ERROR, "Non-optional step has no handlers.");
        return Err(Err::from(FlowError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }
    };

    for phase in Phase::ALL {
      for (handler_idx, handler_fn) in handlers.phase(phase).iter().enumerate() {
        match handler_fn(ctx_data.clone()).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => {
            event!(Level::DEBUG, %phase, handler_idx, "Handler requested stop.");
            return Ok(StepOutcome::Stopped);
          }
          Err(e) => {
            event!(Level::WARN, %phase, handler_idx, error = %e, "Handler failed.");
            return Err(e);
          }
        }
      }
    }
    Ok(StepOutcome::Ran)
  }
}
