// storefront/src/state.rs

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::pipelines;
use crate::store::Store;
use bootbox_flow::FlowRegistry;
use std::sync::Arc;

/// Shared per-process state handed to every handler and pipeline context.
#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
  pub flows: Arc<FlowRegistry<AppError>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Builds the state and registers every pipeline on a fresh registry.
  pub fn new(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Result<Self> {
    let flows = Arc::new(FlowRegistry::<AppError>::new());
    pipelines::register_all_pipelines(&flows)?;
    Ok(Self { store, flows, config })
  }
}
