// tests/error_handling_tests.rs
mod common;

use bootbox_flow::{ContextData, FlowError, Pipeline, PipelineControl};
use common::*;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn pipeline_typed_on_flow_error() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, FlowError>::new(&[("price", false, None)]);
  pipeline
    .on_step("price", |_ctx: ContextData<TallyContext>| async move {
      Err::<PipelineControl, _>(FlowError::Internal("price list unavailable".to_string()))
    })
    .unwrap();

  let result = pipeline.run(ContextData::new(TallyContext::default())).await;

  match result {
    Err(FlowError::Internal(s)) => assert_eq!(s, "price list unavailable"),
    other => panic!("expected FlowError::Internal, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn anyhow_errors_are_wrapped_as_handler_errors() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, FlowError>::new(&[("notify", false, None)]);
  pipeline
    .on_step("notify", |_ctx: ContextData<TallyContext>| async move {
      Err::<PipelineControl, _>(anyhow::anyhow!("smtp refused"))
    })
    .unwrap();

  let result = pipeline.run(ContextData::new(TallyContext::default())).await;

  match result {
    Err(FlowError::Handler { source }) => assert_eq!(source.to_string(), "smtp refused"),
    other => panic!("expected FlowError::Handler, got {:?}", other),
  }
}

#[test]
fn flow_error_boxed_in_anyhow_is_recovered() {
  let boxed = anyhow::Error::new(FlowError::StepNotFound {
    step_name: "persist".to_string(),
  });
  match FlowError::from(boxed) {
    FlowError::StepNotFound { step_name } => assert_eq!(step_name, "persist"),
    other => panic!("expected StepNotFound, got {:?}", other),
  }
}
