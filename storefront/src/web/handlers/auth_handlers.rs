// storefront/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use bootbox_flow::{ContextData, PipelineResult};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::payloads::SigninRequest;
use crate::pipelines::contexts::SigninCtxData;
use crate::state::AppState;

#[instrument(name = "handler::signin", skip(app_state, req_payload))]
pub async fn signin_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SigninRequest>,
) -> Result<HttpResponse, AppError> {
  let SigninRequest { email, password } = req_payload.into_inner();
  let ctx_data = ContextData::new(SigninCtxData::new(app_state.get_ref().clone(), email, password));

  match app_state.flows.run(ctx_data.clone()).await {
    Ok(PipelineResult::Completed) => {
      let guard = ctx_data.read();
      let manager = guard.manager.as_ref().ok_or_else(|| {
        warn!("Sign-in pipeline completed without a manager.");
        AppError::Auth("Sign-in completed without user identification.".to_string())
      })?;
      let token = guard.token.clone().ok_or_else(|| {
        warn!("Sign-in pipeline completed without a token.");
        AppError::Auth("Sign-in completed without token generation.".to_string())
      })?;

      info!(manager_id = %manager.id, "Sign-in successful.");
      Ok(HttpResponse::Ok().json(json!({
        "managerId": manager.id,
        "email": manager.email,
        "fullName": manager.full_name,
        "token": token,
      })))
    }
    Ok(PipelineResult::Stopped) => {
      warn!("Sign-in pipeline was stopped by a handler.");
      Err(AppError::Auth("Authentication process was unexpectedly halted.".to_string()))
    }
    Err(app_err) => {
      warn!("Sign-in failed: {}", app_err);
      Err(app_err)
    }
  }
}
