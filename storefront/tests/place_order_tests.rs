// tests/place_order_tests.rs
mod common;

use common::*;
use serial_test::serial;
use uuid::Uuid;

use storefront::errors::AppError;
use storefront::models::{DeliveryStatus, PaymentStatus, ProductPatch};
use storefront::pipelines::place_order_pipeline::place_order;
use storefront::services::order_number::parse_order_number;
use storefront::services::pricing::VariantPolicy;

#[tokio::test]
#[serial]
async fn two_units_at_catalog_price_total_two_hundred() {
  let (state, store) = memory_state(config_with_policy(VariantPolicy::Fallback));
  let fx = seed_fixture(&store).await;

  let order = place_order(&state, order_request(fx.customer, vec![line(fx.plain_product, None, 2)]))
    .await
    .unwrap();

  assert_eq!(order.order.total_amount, rub(200));
  assert_eq!(order.order.currency, "RUB");
  assert_eq!(order.order.payment_status, PaymentStatus::Pending);
  assert_eq!(order.order.delivery_status, DeliveryStatus::Pending);
  assert_eq!(order.items.len(), 1);
  assert_eq!(order.items[0].item.unit_price, rub(100));
  assert_eq!(order.items[0].item.quantity, 2);
  assert_eq!(order.items[0].product.as_ref().map(|p| p.id), Some(fx.plain_product));
  assert_eq!(order.customer.as_ref().map(|c| c.id), Some(fx.customer));
  assert!(order.manager.is_none());

  let parts = parse_order_number(&order.order.order_number).unwrap();
  assert_eq!(parts.prefix, "BB");
}

#[tokio::test]
#[serial]
async fn variant_price_overrides_product_price() {
  let (state, store) = memory_state(config_with_policy(VariantPolicy::Fallback));
  let fx = seed_fixture(&store).await;

  let order = place_order(
    &state,
    order_request(
      fx.customer,
      vec![
        line(fx.sized_product, Some(fx.size_42), 1),
        line(fx.sized_product, Some(fx.size_40), 1),
      ],
    ),
  )
  .await
  .unwrap();

  assert_eq!(order.order.total_amount, rub(220));
  assert_eq!(order.items[0].item.unit_price, rub(120));
  assert_eq!(order.items[0].item.variant_id, Some(fx.size_42));
  assert_eq!(order.items[0].variant.as_ref().map(|v| v.label.as_str()), Some("42"));
  assert_eq!(order.items[1].item.unit_price, rub(100));
  assert_eq!(order.items[1].item.variant_id, Some(fx.size_40));
}

#[tokio::test]
#[serial]
async fn unknown_variant_falls_back_to_product_price() {
  let (state, store) = memory_state(config_with_policy(VariantPolicy::Fallback));
  let fx = seed_fixture(&store).await;

  let order = place_order(
    &state,
    order_request(fx.customer, vec![line(fx.sized_product, Some(Uuid::new_v4()), 3)]),
  )
  .await
  .unwrap();

  assert_eq!(order.order.total_amount, rub(300));
  assert_eq!(order.items[0].item.unit_price, rub(100));
  assert_eq!(order.items[0].item.variant_id, None);
}

#[tokio::test]
#[serial]
async fn unknown_variant_is_rejected_under_strict_policy() {
  let (state, store) = memory_state(config_with_policy(VariantPolicy::Strict));
  let fx = seed_fixture(&store).await;
  let bogus = Uuid::new_v4();

  let err = place_order(&state, order_request(fx.customer, vec![line(fx.sized_product, Some(bogus), 1)]))
    .await
    .unwrap_err();

  match err {
    AppError::VariantNotFound { product_id, variant_id } => {
      assert_eq!(product_id, fx.sized_product);
      assert_eq!(variant_id, bogus);
    }
    other => panic!("expected VariantNotFound, got {:?}", other),
  }
  assert_eq!(store.order_count(), 0);
}

#[tokio::test]
#[serial]
async fn unknown_product_creates_nothing() {
  let (state, store) = memory_state(config_with_policy(VariantPolicy::Fallback));
  let fx = seed_fixture(&store).await;
  let ghost = Uuid::new_v4();

  let err = place_order(
    &state,
    order_request(fx.customer, vec![line(fx.plain_product, None, 1), line(ghost, None, 1)]),
  )
  .await
  .unwrap_err();

  match err {
    AppError::ProductNotFound { missing } => assert_eq!(missing, vec![ghost]),
    other => panic!("expected ProductNotFound, got {:?}", other),
  }
  assert_eq!(store.order_count(), 0);
  assert_eq!(store.order_item_count(), 0);
}

#[tokio::test]
#[serial]
async fn empty_items_fail_before_touching_the_store() {
  let (state, store) = memory_state(config_with_policy(VariantPolicy::Fallback));
  let fx = seed_fixture(&store).await;
  let calls_before = store.call_count();

  let err = place_order(&state, order_request(fx.customer, Vec::new())).await.unwrap_err();

  match err {
    AppError::Validation(fields) => {
      assert_eq!(fields.get("items"), Some(&["must contain at least one item".to_string()][..]));
    }
    other => panic!("expected Validation, got {:?}", other),
  }
  assert_eq!(store.call_count(), calls_before);
}

#[tokio::test]
#[serial]
async fn invalid_fields_are_reported_together() {
  let (state, store) = memory_state(config_with_policy(VariantPolicy::Fallback));
  let fx = seed_fixture(&store).await;

  let mut request = order_request(fx.customer, vec![line(fx.plain_product, None, 0)]);
  request.customer_id = Some("not-a-uuid".to_string());
  request.payment_status = Some("MAYBE".to_string());

  let err = place_order(&state, request).await.unwrap_err();
  let AppError::Validation(fields) = err else {
    panic!("expected Validation");
  };
  assert!(fields.contains("customerId"));
  assert!(fields.contains("paymentStatus"));
  assert!(fields.contains("items[0].quantity"));
  assert_eq!(store.order_count(), 0);
}

#[tokio::test]
#[serial]
async fn same_request_twice_creates_two_orders() {
  let (state, store) = memory_state(config_with_policy(VariantPolicy::Fallback));
  let fx = seed_fixture(&store).await;

  let first = place_order(&state, order_request(fx.customer, vec![line(fx.plain_product, None, 1)]))
    .await
    .unwrap();
  let second = place_order(&state, order_request(fx.customer, vec![line(fx.plain_product, None, 1)]))
    .await
    .unwrap();

  assert_ne!(first.order.id, second.order.id);
  assert_eq!(store.order_count(), 2);
}

#[tokio::test]
#[serial]
async fn concurrent_orders_for_the_last_unit_both_succeed() {
  let (state, store) = memory_state(config_with_policy(VariantPolicy::Fallback));
  let fx = seed_fixture(&store).await;

  let (a, b) = tokio::join!(
    place_order(&state, order_request(fx.customer, vec![line(fx.last_unit_product, None, 1)])),
    place_order(&state, order_request(fx.customer, vec![line(fx.last_unit_product, None, 1)])),
  );

  assert!(a.is_ok());
  assert!(b.is_ok());
  assert_eq!(store.order_count(), 2);
}

#[tokio::test]
#[serial]
async fn unknown_customer_is_a_constraint_failure() {
  let (state, store) = memory_state(config_with_policy(VariantPolicy::Fallback));
  let fx = seed_fixture(&store).await;

  let err = place_order(&state, order_request(Uuid::new_v4(), vec![line(fx.plain_product, None, 1)]))
    .await
    .unwrap_err();

  assert!(matches!(err, AppError::Constraint(_)), "got {:?}", err);
  assert_eq!(store.order_count(), 0);
}

#[tokio::test]
#[serial]
async fn assigned_manager_and_statuses_are_kept() {
  let (state, store) = memory_state(config_with_policy(VariantPolicy::Fallback));
  let fx = seed_fixture(&store).await;

  let mut request = order_request(fx.customer, vec![line(fx.plain_product, None, 1)]);
  request.manager_id = Some(fx.manager.to_string());
  request.payment_status = Some("PAID".to_string());
  request.currency = Some("usd".to_string());

  let order = place_order(&state, request).await.unwrap();
  assert_eq!(order.order.payment_status, PaymentStatus::Paid);
  assert_eq!(order.order.currency, "USD");
  assert_eq!(order.manager.as_ref().map(|m| m.id), Some(fx.manager));

  let listed = state.store.get_order_detail(order.order.id).await.unwrap().unwrap();
  assert_eq!(listed, order);
}

#[tokio::test]
#[serial]
async fn large_quantities_are_accepted() {
  let (state, store) = memory_state(config_with_policy(VariantPolicy::Fallback));
  let fx = seed_fixture(&store).await;

  let order = place_order(&state, order_request(fx.customer, vec![line(fx.plain_product, None, 10_000)]))
    .await
    .unwrap();

  assert_eq!(order.order.total_amount, rub(1_000_000));
  assert_eq!(order.items[0].item.quantity, 10_000);
}

#[tokio::test]
#[serial]
async fn later_price_change_leaves_placed_order_untouched() {
  let (state, store) = memory_state(config_with_policy(VariantPolicy::Fallback));
  let fx = seed_fixture(&store).await;

  let order = place_order(&state, order_request(fx.customer, vec![line(fx.plain_product, None, 3)]))
    .await
    .unwrap();
  assert_eq!(order.order.total_amount, rub(300));

  let changed = state
    .store
    .update_product(
      fx.plain_product,
      ProductPatch {
        price: Some(rub(180)),
        stock_total: Some(0),
        ..ProductPatch::default()
      },
    )
    .await
    .unwrap();
  assert!(changed);

  let stored = state.store.get_order_detail(order.order.id).await.unwrap().unwrap();
  assert_eq!(stored.order.total_amount, rub(300));
  assert_eq!(stored.items[0].item.unit_price, rub(100));
  assert_eq!(stored.items[0].product.as_ref().map(|p| p.price), Some(rub(180)));

  let repriced = place_order(&state, order_request(fx.customer, vec![line(fx.plain_product, None, 3)]))
    .await
    .unwrap();
  assert_eq!(repriced.order.total_amount, rub(540));
}
