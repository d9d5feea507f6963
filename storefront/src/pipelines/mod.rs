// storefront/src/pipelines/mod.rs

//! Defines and registers all pipelines used by the storefront.

use crate::errors::AppError;
use bootbox_flow::{FlowError, FlowRegistry};

pub mod contexts;

pub mod place_order_pipeline;
pub mod product_pipeline;
pub mod signin_pipeline;

/// Registers every pipeline on `flows`. Called once per `AppState`.
pub fn register_all_pipelines(flows: &FlowRegistry<AppError>) -> Result<(), FlowError> {
  tracing::info!("Registering pipelines...");

  place_order_pipeline::register_place_order_pipeline(flows)?;
  product_pipeline::register_create_product_pipeline(flows)?;
  signin_pipeline::register_signin_pipeline(flows)?;

  tracing::info!(count = flows.len(), "All application pipelines registered.");
  Ok(())
}
