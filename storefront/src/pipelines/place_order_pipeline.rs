// storefront/src/pipelines/place_order_pipeline.rs

//! Order placement: validate, resolve the catalog, snapshot prices, persist,
//! read back. Every failure happens before or inside the single transactional
//! write, so a failed run leaves no order behind.
//!
//! No stock is reserved or decremented here; two orders for the last unit of
//! a product both succeed.

use bootbox_flow::{ContextData, FlowError, FlowRegistry, Pipeline, PipelineControl, PipelineResult};
use chrono::Utc;
use std::collections::HashMap;
use tracing::{event, info, instrument, warn, Level};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::payloads::CreateOrderRequest;
use crate::models::{NewOrder, OrderDetail, Product};
use crate::pipelines::contexts::PlaceOrderCtxData;
use crate::services::order_number::generate_order_number;
use crate::services::pricing::snapshot_prices;
use crate::services::validation::{validate_create_order, ValidatedOrder};
use crate::state::AppState;

pub const STEPS: [&str; 5] = [
  "validate_order_request",
  "resolve_catalog",
  "snapshot_prices",
  "persist_order",
  "read_back_order",
];

fn missing(what: &str) -> AppError {
  AppError::Internal(format!("{} missing from place-order context", what))
}

fn validated(data: &PlaceOrderCtxData) -> Result<&ValidatedOrder, AppError> {
  data.validated.as_ref().ok_or_else(|| missing("validated order"))
}

#[instrument(name = "place_order::validate_order_request", skip_all)]
async fn validate_order_request_step(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl, AppError> {
  let outcome = {
    let guard = ctx_data.read();
    validate_create_order(&guard.request, &guard.app_state.config.default_currency)
  };

  match outcome {
    Ok(order) => {
      event!(
        Level::DEBUG,
        customer_id = %order.customer_id,
        items = order.items.len(),
        "Order request validated."
      );
      ctx_data.write().validated = Some(order);
      Ok(PipelineControl::Continue)
    }
    Err(fields) => {
      warn!(invalid_fields = fields.len(), "Order request rejected: {}", fields);
      Err(AppError::Validation(fields))
    }
  }
}

#[instrument(name = "place_order::resolve_catalog", skip_all)]
async fn resolve_catalog_step(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl, AppError> {
  let (store, ids) = {
    let guard = ctx_data.read();
    (guard.app_state.store.clone(), validated(&guard)?.distinct_product_ids())
  };

  let products = store.fetch_products_with_variants(&ids).await?;
  let found: HashMap<Uuid, Product> = products.into_iter().map(|p| (p.id, p)).collect();

  if found.len() != ids.len() {
    let missing: Vec<Uuid> = ids.iter().filter(|id| !found.contains_key(id)).copied().collect();
    warn!(requested = ids.len(), found = found.len(), ?missing, "Order references unknown products.");
    return Err(AppError::ProductNotFound { missing });
  }

  event!(Level::DEBUG, products = found.len(), "Catalog resolved.");
  ctx_data.write().products = found;
  Ok(PipelineControl::Continue)
}

#[instrument(name = "place_order::snapshot_prices", skip_all)]
async fn snapshot_prices_step(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl, AppError> {
  let snapshot = {
    let guard = ctx_data.read();
    let order = validated(&guard)?;
    snapshot_prices(&order.items, &guard.products, guard.app_state.config.variant_policy)?
  };

  event!(Level::DEBUG, total = %snapshot.total, lines = snapshot.items.len(), "Prices snapshotted.");
  ctx_data.write().snapshot = Some(snapshot);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "place_order::persist_order", skip_all)]
async fn persist_order_step(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl, AppError> {
  let (store, new_order) = {
    let guard = ctx_data.read();
    let order = validated(&guard)?;
    let snapshot = guard.snapshot.as_ref().ok_or_else(|| missing("price snapshot"))?;
    let now = Utc::now();
    let new_order = NewOrder {
      order_number: generate_order_number(&guard.app_state.config.order_number_prefix, now),
      customer_id: order.customer_id,
      manager_id: order.manager_id,
      currency: order.currency.clone(),
      total_amount: snapshot.total,
      payment_status: order.payment_status,
      delivery_status: order.delivery_status,
      created_at: now,
      items: snapshot.items.clone(),
    };
    (guard.app_state.store.clone(), new_order)
  };

  let order_number = new_order.order_number.clone();
  let total = new_order.total_amount;
  let order_id = store.insert_order(new_order).await?;

  {
    let mut guard = ctx_data.write();
    guard.order_id = Some(order_id);
    guard.order_number = Some(order_number.clone());
  }
  info!(%order_id, %order_number, %total, "Order persisted.");
  Ok(PipelineControl::Continue)
}

#[instrument(name = "place_order::read_back_order", skip_all)]
async fn read_back_order_step(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl, AppError> {
  let (store, order_id) = {
    let guard = ctx_data.read();
    let order_id = guard.order_id.ok_or_else(|| missing("order id"))?;
    (guard.app_state.store.clone(), order_id)
  };

  let detail = store
    .get_order_detail(order_id)
    .await?
    .ok_or_else(|| AppError::Internal(format!("Order {} not found right after it was written", order_id)))?;

  ctx_data.write().order = Some(detail);
  Ok(PipelineControl::Continue)
}

pub fn build_place_order_pipeline() -> Result<Pipeline<PlaceOrderCtxData, AppError>, FlowError> {
  let mut p = Pipeline::<PlaceOrderCtxData, AppError>::new(&[
    ("validate_order_request", false, None),
    ("resolve_catalog", false, None),
    ("snapshot_prices", false, None),
    ("persist_order", false, None),
    ("read_back_order", false, None),
  ]);

  p.on_step("validate_order_request", validate_order_request_step)?;
  p.on_step("resolve_catalog", resolve_catalog_step)?;
  p.on_step("snapshot_prices", snapshot_prices_step)?;
  p.on_step("persist_order", persist_order_step)?;
  p.on_step("read_back_order", read_back_order_step)?;
  Ok(p)
}

pub fn register_place_order_pipeline(flows: &FlowRegistry<AppError>) -> Result<(), FlowError> {
  flows.register(build_place_order_pipeline()?);
  info!("Place-order pipeline registered.");
  Ok(())
}

/// Runs the registered place-order pipeline for `request` and returns the read-back order.
#[instrument(name = "place_order", skip_all)]
pub async fn place_order(app_state: &AppState, request: CreateOrderRequest) -> Result<OrderDetail, AppError> {
  let ctx_data = ContextData::new(PlaceOrderCtxData::new(app_state.clone(), request));

  match app_state.flows.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let order = ctx_data.write().order.take();
      order.ok_or_else(|| missing("read-back order"))
    }
    PipelineResult::Stopped => {
      warn!("Place-order pipeline was stopped by a handler.");
      Err(AppError::PipelineHaltedByHandler)
    }
  }
}
