// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::payloads::{CreateOrderRequest, OrderListQuery, UpdateOrderRequest};
use crate::pipelines::place_order_pipeline::place_order;
use crate::services::validation::{parse_id, validate_order_filter, validate_order_patch};
use crate::state::AppState;

#[instrument(name = "handler::create_order", skip(app_state, req_payload), fields(items = req_payload.items.as_ref().map_or(0, Vec::len)))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
  match place_order(app_state.get_ref(), req_payload.into_inner()).await {
    Ok(order) => {
      info!(
        order_id = %order.order.id,
        order_number = %order.order.order_number,
        total = %order.order.total_amount,
        "Order placed."
      );
      Ok(HttpResponse::Created().json(order))
    }
    Err(app_err) => {
      warn!("Order placement failed: {}", app_err);
      Err(app_err)
    }
  }
}

#[instrument(name = "handler::list_orders", skip(app_state, query_params))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<OrderListQuery>,
) -> Result<HttpResponse, AppError> {
  let filter = validate_order_filter(&query_params)?;
  let orders = app_state.store.list_orders(&filter).await?;
  info!(count = orders.len(), "Orders listed.");
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(name = "handler::get_order", skip(app_state))]
pub async fn get_order_handler(app_state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, AppError> {
  let order_id = parse_id("id", &path)?;
  match app_state.store.get_order_detail(order_id).await? {
    Some(order) => Ok(HttpResponse::Ok().json(order)),
    None => Err(AppError::NotFound(format!("Order {} not found", order_id))),
  }
}

#[instrument(name = "handler::update_order", skip(app_state, req_payload))]
pub async fn update_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  req_payload: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
  let order_id = parse_id("id", &path)?;
  let patch = validate_order_patch(&req_payload)?;

  if !app_state.store.update_order(order_id, patch).await? {
    return Err(AppError::NotFound(format!("Order {} not found", order_id)));
  }
  let order = app_state
    .store
    .get_order_detail(order_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order_id)))?;
  info!(
    %order_id,
    payment_status = %order.order.payment_status,
    delivery_status = %order.order.delivery_status,
    "Order updated."
  );
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::delete_order", skip(app_state))]
pub async fn delete_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let order_id = parse_id("id", &path)?;
  if app_state.store.delete_order(order_id).await? {
    info!(%order_id, "Order deleted.");
    Ok(HttpResponse::NoContent().finish())
  } else {
    Err(AppError::NotFound(format!("Order {} not found", order_id)))
  }
}
