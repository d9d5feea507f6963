// storefront/src/pipelines/contexts.rs

//! Data structs the pipelines run over. Handlers receive them wrapped in
//! `bootbox_flow::ContextData`.

use std::collections::HashMap;
use uuid::Uuid;

use crate::models::payloads::{CreateOrderRequest, CreateProductRequest};
use crate::models::{Manager, NewProduct, OrderDetail, Product};
use crate::services::pricing::PriceSnapshot;
use crate::services::validation::ValidatedOrder;
use crate::state::AppState;

/// One order placement, filled in step by step.
#[derive(Clone)]
pub struct PlaceOrderCtxData {
  pub app_state: AppState,
  pub request: CreateOrderRequest,
  pub validated: Option<ValidatedOrder>,
  /// Resolved catalog, keyed by product id.
  pub products: HashMap<Uuid, Product>,
  pub snapshot: Option<PriceSnapshot>,
  pub order_id: Option<Uuid>,
  pub order_number: Option<String>,
  pub order: Option<OrderDetail>,
}

impl PlaceOrderCtxData {
  pub fn new(app_state: AppState, request: CreateOrderRequest) -> Self {
    Self {
      app_state,
      request,
      validated: None,
      products: HashMap::new(),
      snapshot: None,
      order_id: None,
      order_number: None,
      order: None,
    }
  }
}

#[derive(Clone)]
pub struct CreateProductCtxData {
  pub app_state: AppState,
  pub request: CreateProductRequest,
  pub validated: Option<NewProduct>,
  pub product_id: Option<Uuid>,
  pub product: Option<Product>,
}

impl CreateProductCtxData {
  pub fn new(app_state: AppState, request: CreateProductRequest) -> Self {
    Self {
      app_state,
      request,
      validated: None,
      product_id: None,
      product: None,
    }
  }
}

#[derive(Clone)]
pub struct SigninCtxData {
  pub app_state: AppState,
  pub email: String,
  pub password: String,
  pub manager: Option<Manager>,
  pub token: Option<String>,
}

impl SigninCtxData {
  pub fn new(app_state: AppState, email: String, password: String) -> Self {
    Self {
      app_state,
      email,
      password,
      manager: None,
      token: None,
    }
  }
}
