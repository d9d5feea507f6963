// storefront/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use bootbox_flow::{ContextData, PipelineResult};
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::payloads::{CreateProductRequest, ProductListQuery, UpdateProductRequest};
use crate::pipelines::contexts::CreateProductCtxData;
use crate::services::validation::{parse_id, validate_product_filter, validate_product_patch};
use crate::state::AppState;

#[instrument(name = "handler::list_products", skip(app_state, query_params))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ProductListQuery>,
) -> Result<HttpResponse, AppError> {
  let filter = validate_product_filter(&query_params)?;
  let products = app_state.store.list_products(&filter).await?;
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::get_product", skip(app_state))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let product_id = parse_id("id", &path)?;
  match app_state.store.get_product(product_id).await? {
    Some(product) => Ok(HttpResponse::Ok().json(product)),
    None => Err(AppError::NotFound(format!("Product {} not found", product_id))),
  }
}

#[instrument(name = "handler::create_product", skip(app_state, req_payload), fields(sku = ?req_payload.sku))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
  let ctx_data = ContextData::new(CreateProductCtxData::new(
    app_state.get_ref().clone(),
    req_payload.into_inner(),
  ));

  match app_state.flows.run(ctx_data.clone()).await {
    Ok(PipelineResult::Completed) => {
      let product = ctx_data
        .write()
        .product
        .take()
        .ok_or_else(|| AppError::Internal("Product pipeline completed without a product.".to_string()))?;
      info!(product_id = %product.id, sku = %product.sku, "Product created.");
      Ok(HttpResponse::Created().json(product))
    }
    Ok(PipelineResult::Stopped) => {
      warn!("Create-product pipeline was stopped by a handler.");
      Err(AppError::PipelineHaltedByHandler)
    }
    Err(app_err) => {
      warn!("Product creation failed: {}", app_err);
      Err(app_err)
    }
  }
}

/// Changes price and stock fields. Orders already placed keep their snapshotted prices.
#[instrument(name = "handler::update_product", skip(app_state, req_payload))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  req_payload: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
  let product_id = parse_id("id", &path)?;
  let patch = validate_product_patch(&req_payload)?;

  if !app_state.store.update_product(product_id, patch).await? {
    return Err(AppError::NotFound(format!("Product {} not found", product_id)));
  }
  let product = app_state
    .store
    .get_product(product_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Product {} not found", product_id)))?;
  info!(%product_id, price = %product.price, stock_total = product.stock_total, "Product updated.");
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(name = "handler::list_categories", skip(app_state))]
pub async fn list_categories_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let categories = app_state.store.list_categories().await?;
  Ok(HttpResponse::Ok().json(categories))
}
