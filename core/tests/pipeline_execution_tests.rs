// tests/pipeline_execution_tests.rs
mod common;

use bootbox_flow::{ContextData, FlowError, Phase, Pipeline, PipelineControl, PipelineResult};
use common::*;
use serial_test::serial;
use std::sync::Arc;

#[tokio::test]
#[serial]
async fn steps_run_in_declaration_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, TestError>::new(&[
    ("validate", false, None),
    ("price", false, None),
    ("persist", false, None),
  ]);
  pipeline.on_step("validate", create_tally_handler("validate", 0)).unwrap();
  pipeline.on_step("price", create_tally_handler("price", 12_000)).unwrap();
  pipeline.on_step("persist", create_tally_handler("persist", 0)).unwrap();

  let ctx = ContextData::new(TallyContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);
  let guard = ctx.read();
  assert_eq!(guard.counter, 3);
  assert_eq!(guard.total_cents, 12_000);
  assert_eq!(guard.trail, vec!["validate", "price", "persist"]);
}

#[tokio::test]
#[serial]
async fn stop_signal_halts_remaining_steps() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, TestError>::new(&[
    ("validate", false, None),
    ("price", false, None),
    ("persist", false, None),
  ]);
  pipeline.on_step("validate", create_tally_handler("validate", 0)).unwrap();
  pipeline.on_step("price", create_tally_handler("price", 500)).unwrap();
  pipeline.on_step("persist", create_tally_handler("persist", 0)).unwrap();

  let ctx = ContextData::new(TallyContext {
    stop_at: Some("price".to_string()),
    ..Default::default()
  });
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Stopped);
  assert_eq!(ctx.read().trail, vec!["validate", "price"]);
}

#[tokio::test]
#[serial]
async fn handler_error_aborts_the_run() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, TestError>::new(&[
    ("validate", false, None),
    ("resolve", false, None),
    ("persist", false, None),
  ]);
  pipeline.on_step("validate", create_tally_handler("validate", 0)).unwrap();
  pipeline.on_step("resolve", create_failing_handler("resolve", "unknown product")).unwrap();
  pipeline.on_step("persist", create_tally_handler("persist", 0)).unwrap();

  let ctx = ContextData::new(TallyContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap_err(), TestError::Handler("unknown product".to_string()));
  let guard = ctx.read();
  assert_eq!(guard.counter, 1);
  assert_eq!(guard.trail, vec!["validate", "resolve"]);
}

#[tokio::test]
#[serial]
async fn skip_condition_skips_step() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, TestError>::new(&[
    ("base", false, None),
    (
      "surcharge",
      false,
      Some(Arc::new(|ctx: ContextData<TallyContext>| ctx.read().total_cents >= 10_000)),
    ),
    ("persist", false, None),
  ]);
  pipeline.on_step("base", create_tally_handler("base", 10_000)).unwrap();
  pipeline.on_step("surcharge", create_tally_handler("surcharge", 300)).unwrap();
  pipeline.on_step("persist", create_tally_handler("persist", 0)).unwrap();

  let ctx = ContextData::new(TallyContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);

  let guard = ctx.read();
  assert_eq!(guard.total_cents, 10_000);
  assert_eq!(guard.trail, vec!["base", "persist"]);
}

#[tokio::test]
#[serial]
async fn non_optional_step_without_handlers_fails() {
  setup_tracing();
  let pipeline = Pipeline::<TallyContext, TestError>::new(&[("persist", false, None)]);

  let result = pipeline.run(ContextData::new(TallyContext::default())).await;

  match result {
    Err(TestError::Flow(s)) => {
      assert!(s.contains("HandlerMissing"));
      assert!(s.contains("persist"));
    }
    other => panic!("expected HandlerMissing, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn optional_step_without_handlers_is_skipped() {
  setup_tracing();
  let pipeline = Pipeline::<TallyContext, TestError>::new(&[("notify", true, None)]);

  let result = pipeline.run(ContextData::new(TallyContext::default())).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);
}

#[tokio::test]
#[serial]
async fn required_step_made_optional_is_skipped_without_handlers() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, TestError>::new(&[
    ("validate", false, None),
    ("notify", false, None),
    ("persist", false, None),
  ]);
  pipeline.on_step("validate", create_tally_handler("validate", 0)).unwrap();
  pipeline.on_step("persist", create_tally_handler("persist", 0)).unwrap();

  let failed = pipeline.run(ContextData::new(TallyContext::default())).await;
  assert!(matches!(failed, Err(TestError::Flow(ref s)) if s.contains("HandlerMissing")));

  pipeline.set_optional("notify", true).unwrap();
  let ctx = ContextData::new(TallyContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx.read().trail, vec!["validate", "persist"]);

  assert!(pipeline.set_optional("missing", true).is_err());
}

#[tokio::test]
#[serial]
async fn skip_condition_attached_later_prevents_handler_from_running() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, TestError>::new(&[
    ("base", false, None),
    ("discount", false, None),
    ("persist", false, None),
  ]);
  pipeline.on_step("base", create_tally_handler("base", 5_000)).unwrap();
  pipeline.on_step("discount", create_failing_handler("discount", "must not run")).unwrap();
  pipeline.on_step("persist", create_tally_handler("persist", 0)).unwrap();

  pipeline
    .set_skip_condition("discount", Some(Arc::new(|_ctx: ContextData<TallyContext>| true)))
    .unwrap();

  let ctx = ContextData::new(TallyContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  {
    let guard = ctx.read();
    assert_eq!(guard.trail, vec!["base", "persist"]);
    assert_eq!(guard.total_cents, 5_000);
  }

  pipeline.set_skip_condition("discount", None).unwrap();
  let result = pipeline.run(ContextData::new(TallyContext::default())).await;
  assert_eq!(result.unwrap_err(), TestError::Handler("must not run".to_string()));
}

#[tokio::test]
#[serial]
async fn phases_run_before_on_after() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, TestError>::new(&[("persist", false, None)]);

  // Registered out of order on purpose.
  pipeline.after_step("persist", create_tally_handler("after", 0)).unwrap();
  pipeline.on_step("persist", create_tally_handler("on", 0)).unwrap();
  pipeline.before_step("persist", create_tally_handler("before", 0)).unwrap();
  pipeline.on_step("persist", create_tally_handler("on_second", 0)).unwrap();

  let ctx = ContextData::new(TallyContext::default());
  pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().trail, vec!["before", "on", "on_second", "after"]);
  assert_eq!(pipeline.handler_count("persist", Phase::On), 2);
}

#[tokio::test]
#[serial]
async fn steps_can_be_inserted_and_removed() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, TestError>::new(&[("validate", false, None), ("persist", false, None)]);
  pipeline.insert_after("validate", "price", false, None).unwrap();
  pipeline.insert_before("validate", "audit", true, None).unwrap();
  assert_eq!(pipeline.step_names(), vec!["audit", "validate", "price", "persist"]);

  pipeline.on_step("validate", create_tally_handler("validate", 0)).unwrap();
  pipeline.on_step("price", create_tally_handler("price", 700)).unwrap();
  pipeline.on_step("persist", create_tally_handler("persist", 0)).unwrap();
  pipeline.remove_step("price").unwrap();
  assert_eq!(pipeline.step_names(), vec!["audit", "validate", "persist"]);
  assert_eq!(pipeline.handler_count("price", Phase::On), 0);

  let ctx = ContextData::new(TallyContext::default());
  pipeline.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().trail, vec!["validate", "persist"]);
  assert_eq!(ctx.read().total_cents, 0);
}

#[test]
fn structural_misuse_is_reported_as_flow_error() {
  let mut pipeline = Pipeline::<TallyContext, TestError>::new(&[("validate", false, None)]);

  assert!(matches!(
    pipeline.insert_after("validate", "validate", false, None),
    Err(FlowError::DuplicateStep { .. })
  ));
  assert!(matches!(
    pipeline.remove_step("missing"),
    Err(FlowError::StepNotFound { .. })
  ));
  let registered = pipeline.on_step("missing", |_ctx: ContextData<TallyContext>| async move {
    Ok::<_, TestError>(PipelineControl::Continue)
  });
  assert!(matches!(registered, Err(FlowError::StepNotFound { step_name }) if step_name == "missing"));
}

#[test]
fn duplicate_names_in_new_are_collapsed() {
  let pipeline = Pipeline::<TallyContext, TestError>::new(&[
    ("validate", false, None),
    ("validate", true, None),
    ("persist", false, None),
  ]);
  assert_eq!(pipeline.step_names(), vec!["validate", "persist"]);
  assert_eq!(pipeline.len(), 2);
}
