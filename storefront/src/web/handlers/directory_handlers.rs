// storefront/src/web/handlers/directory_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::payloads::{CreateCustomerRequest, CreateManagerRequest};
use crate::models::NewManager;
use crate::services::auth_service;
use crate::services::validation::{parse_id, validate_new_customer, validate_new_manager};
use crate::state::AppState;

#[instrument(name = "handler::create_customer", skip(app_state, req_payload))]
pub async fn create_customer_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CreateCustomerRequest>,
) -> Result<HttpResponse, AppError> {
  let new_customer = validate_new_customer(&req_payload)?;
  let customer = app_state.store.create_customer(new_customer).await?;
  info!(customer_id = %customer.id, "Customer created.");
  Ok(HttpResponse::Created().json(customer))
}

#[instrument(name = "handler::list_customers", skip(app_state))]
pub async fn list_customers_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let customers = app_state.store.list_customers().await?;
  Ok(HttpResponse::Ok().json(customers))
}

#[instrument(name = "handler::get_customer", skip(app_state))]
pub async fn get_customer_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let customer_id = parse_id("id", &path)?;
  match app_state.store.get_customer(customer_id).await? {
    Some(customer) => Ok(HttpResponse::Ok().json(customer)),
    None => Err(AppError::NotFound(format!("Customer {} not found", customer_id))),
  }
}

#[instrument(name = "handler::create_manager", skip(app_state, req_payload))]
pub async fn create_manager_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CreateManagerRequest>,
) -> Result<HttpResponse, AppError> {
  let validated = validate_new_manager(&req_payload)?;
  let password_hash = auth_service::hash_password(&validated.password)?;
  let manager = app_state
    .store
    .create_manager(NewManager {
      full_name: validated.full_name,
      email: validated.email,
      password_hash,
    })
    .await?;
  info!(manager_id = %manager.id, "Manager created.");
  Ok(HttpResponse::Created().json(manager))
}

#[instrument(name = "handler::list_managers", skip(app_state))]
pub async fn list_managers_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let managers = app_state.store.list_managers().await?;
  Ok(HttpResponse::Ok().json(managers))
}
