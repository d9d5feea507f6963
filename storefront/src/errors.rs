// storefront/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use bootbox_flow::FlowError;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::services::validation::FieldErrors;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(FieldErrors),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Products not found: {missing:?}")]
  ProductNotFound { missing: Vec<Uuid> },

  #[error("Variant {variant_id} not found for product {product_id}")]
  VariantNotFound { product_id: Uuid, variant_id: Uuid },

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  /// A store-level integrity rule rejected a write (e.g. unknown customer).
  #[error("Constraint violation: {0}")]
  Constraint(String),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),

  // Used by HTTP handlers when a pipeline stops before producing its result.
  #[error("Pipeline execution was halted by a handler.")]
  PipelineHaltedByHandler,
}

impl AppError {
  /// Shorthand for a validation error on a single field.
  pub fn invalid(field: &str, message: impl Into<String>) -> Self {
    AppError::Validation(FieldErrors::single(field, message))
  }
}

impl From<FieldErrors> for AppError {
  fn from(fields: FieldErrors) -> Self {
    AppError::Validation(fields)
  }
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    let err = match err.downcast::<AppError>() {
      Ok(app_err) => return app_err,
      Err(err) => err,
    };
    let err = match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => return AppError::Sqlx(sqlx_err),
      Err(err) => err,
    };
    match err.downcast::<FlowError>() {
      Ok(source) => AppError::Workflow { source },
      Err(err) => AppError::Internal(err.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::ProductNotFound { .. } | AppError::VariantNotFound { .. } | AppError::NotFound(_) => {
        StatusCode::NOT_FOUND
      }
      AppError::PipelineHaltedByHandler => StatusCode::CONFLICT,
      AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Constraint(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Responding with error");
    }
    let body = match self {
      AppError::Validation(fields) => json!({"error": "Validation failed", "fields": fields}),
      AppError::Auth(m) => json!({"error": m}),
      AppError::ProductNotFound { missing } => json!({"error": "Product not found", "missing": missing}),
      AppError::VariantNotFound { product_id, variant_id } => json!({
        "error": "Variant not found",
        "productId": product_id,
        "variantId": variant_id,
      }),
      AppError::NotFound(m) => json!({"error": m}),
      AppError::Config(m) => json!({"error": "Configuration issue", "detail": m}),
      AppError::Sqlx(_) => json!({"error": "Database operation failed"}),
      AppError::Constraint(_) => json!({"error": "Database operation failed"}),
      AppError::Workflow { source } => {
        tracing::error!(flow_error_source = ?source, "Workflow error details");
        json!({"error": "Workflow processing error"})
      }
      AppError::Internal(_) => json!({"error": "An internal error occurred"}),
      AppError::PipelineHaltedByHandler => json!({"error": "Process halted as expected by business logic."}),
    };
    HttpResponse::build(status).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
