// core/src/core/control.rs

//! Flow-control signals returned by handlers and the outcome of a whole run.

/// Returned by every handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  /// Carry on with the remaining handlers and steps.
  Continue,
  /// Halt the run right here. Nothing after this handler executes.
  Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every step either ran or was legitimately skipped.
  Completed,
  /// A handler returned `PipelineControl::Stop`.
  Stopped,
}
