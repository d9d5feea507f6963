// tests/registry_tests.rs
mod common;

use bootbox_flow::{ContextData, FlowError, FlowRegistry, Pipeline, PipelineControl, PipelineResult};
use common::*;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct SigninContext {
  token: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct RestockContext {
  units: i32,
}

#[tokio::test]
async fn dispatches_by_context_type() {
  setup_tracing();
  let registry = FlowRegistry::<TestError>::new();

  let mut signin = Pipeline::<SigninContext, TestError>::new(&[("issue_token", false, None)]);
  signin
    .on_step("issue_token", |ctx: ContextData<SigninContext>| async move {
      ctx.write().token = "t-1".to_string();
      Ok::<_, FlowError>(PipelineControl::Continue)
    })
    .unwrap();
  registry.register(signin);

  let mut restock = Pipeline::<RestockContext, TestError>::new(&[("add_units", false, None)]);
  restock
    .on_step("add_units", |ctx: ContextData<RestockContext>| async move {
      ctx.write().units += 12;
      Ok::<_, FlowError>(PipelineControl::Continue)
    })
    .unwrap();
  registry.register(restock);

  assert_eq!(registry.len(), 2);
  assert!(registry.contains::<SigninContext>());

  let signin_ctx = ContextData::new(SigninContext::default());
  assert_eq!(registry.run(signin_ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(signin_ctx.read().token, "t-1");

  let restock_ctx = ContextData::new(RestockContext::default());
  assert_eq!(registry.run(restock_ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(restock_ctx.read().units, 12);
}

#[tokio::test]
async fn unregistered_context_type_is_a_configuration_error() {
  setup_tracing();
  let registry = FlowRegistry::<TestError>::new();

  #[derive(Default)]
  struct UnregisteredContext;

  let result = registry.run(ContextData::new(UnregisteredContext)).await;

  match result {
    Err(TestError::Flow(s)) => {
      assert!(s.contains("Configuration"));
      assert!(s.contains("UnregisteredContext"));
    }
    other => panic!("expected a configuration error, got {:?}", other),
  }
}

#[tokio::test]
async fn pipeline_errors_pass_through_unchanged() {
  setup_tracing();
  let registry = FlowRegistry::<TestError>::new();

  let mut restock = Pipeline::<RestockContext, TestError>::new(&[("add_units", false, None)]);
  restock
    .on_step("add_units", |_ctx: ContextData<RestockContext>| async move {
      Err::<PipelineControl, _>(TestError::Handler("warehouse offline".to_string()))
    })
    .unwrap();
  registry.register(restock);

  let result = registry.run(ContextData::new(RestockContext::default())).await;
  assert_eq!(result.unwrap_err(), TestError::Handler("warehouse offline".to_string()));
}

#[tokio::test]
async fn registering_twice_replaces_the_pipeline() {
  setup_tracing();
  let registry = FlowRegistry::<FlowError>::default();

  for units in [1, 2] {
    let mut restock = Pipeline::<RestockContext, FlowError>::new(&[("add_units", false, None)]);
    restock
      .on_step("add_units", move |ctx: ContextData<RestockContext>| async move {
        ctx.write().units = units;
        Ok::<_, FlowError>(PipelineControl::Continue)
      })
      .unwrap();
    registry.register(restock);
  }

  assert_eq!(registry.len(), 1);
  let ctx = ContextData::new(RestockContext::default());
  registry.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().units, 2);
}
