// tests/common/mod.rs
#![allow(dead_code)]

use bootbox_flow::{ContextData, FlowError, Handler, HandlerFuture, PipelineControl};
use once_cell::sync::Lazy;
use tracing::Level;

/// A miniature checkout tally: each step appends to `trail` and may add to the total.
#[derive(Clone, Debug, Default)]
pub struct TallyContext {
  pub counter: i32,
  pub total_cents: i64,
  pub trail: Vec<String>,
  pub stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("flow error: {0}")]
  Flow(String),

  #[error("handler failed: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(fe: FlowError) -> Self {
    // Debug keeps the variant name, which the assertions look for.
    TestError::Flow(format!("{:?}", fe))
  }
}

/// Handler that records `label`, bumps the counter and adds `cents` to the total.
pub fn create_tally_handler(label: &'static str, cents: i64) -> Handler<TallyContext, TestError> {
  Box::new(move |ctx: ContextData<TallyContext>| -> HandlerFuture<TestError> {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.total_cents += cents;
      guard.trail.push(label.to_string());
      if guard.stop_at.as_deref() == Some(label) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn create_failing_handler(label: &'static str, message: &'static str) -> Handler<TallyContext, TestError> {
  Box::new(move |ctx: ContextData<TallyContext>| -> HandlerFuture<TestError> {
    Box::pin(async move {
      ctx.write().trail.push(label.to_string());
      Err(TestError::Handler(message.to_string()))
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
