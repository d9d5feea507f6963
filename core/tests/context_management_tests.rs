// tests/context_management_tests.rs
mod common;

use bootbox_flow::{ContextData, FlowError, Pipeline, PipelineControl};
use common::*;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn later_steps_see_earlier_writes() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, TestError>::new(&[("price", false, None), ("discount", false, None)]);

  pipeline
    .on_step("price", |ctx: ContextData<TallyContext>| async move {
      ctx.write().total_cents = 10_000;
      Ok::<_, FlowError>(PipelineControl::Continue)
    })
    .unwrap();
  pipeline
    .on_step("discount", |ctx: ContextData<TallyContext>| async move {
      let mut guard = ctx.write();
      assert_eq!(guard.total_cents, 10_000);
      guard.total_cents -= 1_500;
      Ok::<_, FlowError>(PipelineControl::Continue)
    })
    .unwrap();

  let ctx = ContextData::new(TallyContext::default());
  pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().total_cents, 8_500);
}

#[test]
fn clones_share_the_same_data() {
  let original = ContextData::new(TallyContext {
    counter: 1,
    ..Default::default()
  });
  let cloned = original.clone();

  original.write().counter = 5;
  assert_eq!(cloned.read().counter, 5);

  *cloned.map_write(|d| &mut d.counter) = 10;
  assert_eq!(*original.map_read(|d| &d.counter), 10);
}

#[test]
fn into_inner_needs_the_last_handle() {
  let ctx = ContextData::new(TallyContext {
    total_cents: 42,
    ..Default::default()
  });
  let extra = ctx.clone();

  let ctx = match ctx.into_inner() {
    Ok(_) => panic!("a second handle is still alive"),
    Err(ctx) => ctx,
  };
  drop(extra);

  let data = ctx.into_inner().expect("last handle");
  assert_eq!(data.total_cents, 42);
}

#[tokio::test]
#[serial]
async fn guards_are_released_around_await_points() {
  setup_tracing();
  let ctx = ContextData::new(TallyContext::default());

  let handler_logic = async {
    let before = { ctx.read().counter };
    tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    ctx.write().counter = before + 1;
  };
  handler_logic.await;

  assert_eq!(ctx.read().counter, 1);
  assert!(ctx.try_write().is_some());
}
