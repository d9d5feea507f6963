// storefront/src/pipelines/product_pipeline.rs

//! Product creation with category auto-provisioning.
//!
//! A product may name an existing category by id or describe one by
//! `{slug?, nameRu, nameEn}`; the described category is created inside the
//! same store transaction as the product unless its slug already exists.

use bootbox_flow::{ContextData, FlowError, FlowRegistry, Pipeline, PipelineControl};
use std::sync::Arc;
use tracing::{event, info, instrument, warn, Level};

use crate::errors::AppError;
use crate::models::CategoryRef;
use crate::pipelines::contexts::CreateProductCtxData;
use crate::services::validation::validate_new_product;

#[instrument(name = "create_product::validate_product_request", skip_all)]
async fn validate_product_request_step(ctx_data: ContextData<CreateProductCtxData>) -> Result<PipelineControl, AppError> {
  let outcome = { validate_new_product(&ctx_data.read().request) };
  match outcome {
    Ok(new_product) => {
      ctx_data.write().validated = Some(new_product);
      Ok(PipelineControl::Continue)
    }
    Err(fields) => {
      warn!(invalid_fields = fields.len(), "Product request rejected: {}", fields);
      Err(AppError::Validation(fields))
    }
  }
}

/// Only runs when the product names an existing category.
#[instrument(name = "create_product::check_category", skip_all)]
async fn check_category_step(ctx_data: ContextData<CreateProductCtxData>) -> Result<PipelineControl, AppError> {
  let (store, category_id) = {
    let guard = ctx_data.read();
    match guard.validated.as_ref().and_then(|p| p.category.as_ref()) {
      Some(CategoryRef::Existing(id)) => (guard.app_state.store.clone(), *id),
      _ => return Ok(PipelineControl::Continue),
    }
  };

  match store.get_category(category_id).await? {
    Some(category) => {
      event!(Level::DEBUG, %category_id, slug = %category.slug, "Category exists.");
      Ok(PipelineControl::Continue)
    }
    None => Err(AppError::NotFound(format!("Category {} not found", category_id))),
  }
}

#[instrument(name = "create_product::persist_product", skip_all)]
async fn persist_product_step(ctx_data: ContextData<CreateProductCtxData>) -> Result<PipelineControl, AppError> {
  let (store, new_product) = {
    let guard = ctx_data.read();
    let new_product = guard
      .validated
      .clone()
      .ok_or_else(|| AppError::Internal("validated product missing from context".to_string()))?;
    (guard.app_state.store.clone(), new_product)
  };

  let sku = new_product.sku.clone();
  let product_id = store.create_product(new_product).await?;
  ctx_data.write().product_id = Some(product_id);
  info!(%product_id, %sku, "Product created.");
  Ok(PipelineControl::Continue)
}

#[instrument(name = "create_product::read_back_product", skip_all)]
async fn read_back_product_step(ctx_data: ContextData<CreateProductCtxData>) -> Result<PipelineControl, AppError> {
  let (store, product_id) = {
    let guard = ctx_data.read();
    let product_id = guard
      .product_id
      .ok_or_else(|| AppError::Internal("product id missing from context".to_string()))?;
    (guard.app_state.store.clone(), product_id)
  };

  let product = store
    .get_product(product_id)
    .await?
    .ok_or_else(|| AppError::Internal(format!("Product {} not found right after it was written", product_id)))?;
  ctx_data.write().product = Some(product);
  Ok(PipelineControl::Continue)
}

pub fn build_create_product_pipeline() -> Result<Pipeline<CreateProductCtxData, AppError>, FlowError> {
  let mut p = Pipeline::<CreateProductCtxData, AppError>::new(&[
    ("validate_product_request", false, None),
    (
      "check_category",
      false,
      Some(Arc::new(|ctx: ContextData<CreateProductCtxData>| {
        let guard = ctx.read();
        !matches!(
          guard.validated.as_ref().and_then(|p| p.category.as_ref()),
          Some(CategoryRef::Existing(_))
        )
      })),
    ),
    ("persist_product", false, None),
    ("read_back_product", false, None),
  ]);

  p.on_step("validate_product_request", validate_product_request_step)?;
  p.on_step("check_category", check_category_step)?;
  p.on_step("persist_product", persist_product_step)?;
  p.on_step("read_back_product", read_back_product_step)?;
  Ok(p)
}

pub fn register_create_product_pipeline(flows: &FlowRegistry<AppError>) -> Result<(), FlowError> {
  flows.register(build_create_product_pipeline()?);
  info!("Create-product pipeline registered.");
  Ok(())
}
