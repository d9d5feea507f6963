// storefront/src/pipelines/signin_pipeline.rs

//! Manager sign-in: credential check plus a random opaque token. There is no
//! session store, so the token is not checked anywhere afterwards.

use bootbox_flow::{ContextData, FlowError, FlowRegistry, Pipeline, PipelineControl};
use tracing::{event, info, instrument, warn, Level};

use crate::errors::AppError;
use crate::pipelines::contexts::SigninCtxData;
use crate::services::auth_service;
use crate::services::validation::validate_signin;

const INVALID_CREDENTIALS: &str = "Invalid email or password.";

#[instrument(name = "signin::validate_signin_input", skip_all)]
async fn validate_signin_input_step(ctx_data: ContextData<SigninCtxData>) -> Result<PipelineControl, AppError> {
  let outcome = {
    let guard = ctx_data.read();
    validate_signin(&guard.email, &guard.password)
  };
  let email = outcome.map_err(|fields| {
    warn!("Invalid sign-in input: {}", fields);
    AppError::Validation(fields)
  })?;
  ctx_data.write().email = email;
  Ok(PipelineControl::Continue)
}

#[instrument(name = "signin::fetch_manager", skip_all)]
async fn fetch_manager_step(ctx_data: ContextData<SigninCtxData>) -> Result<PipelineControl, AppError> {
  let (store, email) = {
    let guard = ctx_data.read();
    (guard.app_state.store.clone(), guard.email.clone())
  };

  match store.find_manager_by_email(&email).await? {
    Some(manager) => {
      event!(Level::DEBUG, manager_id = %manager.id, "Manager found for sign-in.");
      ctx_data.write().manager = Some(manager);
      Ok(PipelineControl::Continue)
    }
    None => {
      warn!("No manager registered for the sign-in email.");
      Err(AppError::Auth(INVALID_CREDENTIALS.to_string()))
    }
  }
}

#[instrument(name = "signin::verify_password", skip_all)]
async fn verify_password_step(ctx_data: ContextData<SigninCtxData>) -> Result<PipelineControl, AppError> {
  let verified = {
    let guard = ctx_data.read();
    let manager = guard
      .manager
      .as_ref()
      .ok_or_else(|| AppError::Internal("manager missing from sign-in context".to_string()))?;
    auth_service::verify_password(&manager.password_hash, &guard.password)?
  };

  if verified {
    Ok(PipelineControl::Continue)
  } else {
    warn!("Password mismatch on sign-in.");
    Err(AppError::Auth(INVALID_CREDENTIALS.to_string()))
  }
}

#[instrument(name = "signin::issue_token", skip_all)]
async fn issue_token_step(ctx_data: ContextData<SigninCtxData>) -> Result<PipelineControl, AppError> {
  let token = auth_service::issue_token();
  let manager_id = {
    let mut guard = ctx_data.write();
    guard.token = Some(token);
    guard.manager.as_ref().map(|m| m.id)
  };
  info!(?manager_id, "Sign-in token issued.");
  Ok(PipelineControl::Continue)
}

pub fn build_signin_pipeline() -> Result<Pipeline<SigninCtxData, AppError>, FlowError> {
  let mut p = Pipeline::<SigninCtxData, AppError>::new(&[
    ("validate_signin_input", false, None),
    ("fetch_manager", false, None),
    ("verify_password", false, None),
    ("issue_token", false, None),
  ]);

  p.on_step("validate_signin_input", validate_signin_input_step)?;
  p.on_step("fetch_manager", fetch_manager_step)?;
  p.on_step("verify_password", verify_password_step)?;
  p.on_step("issue_token", issue_token_step)?;
  Ok(p)
}

pub fn register_signin_pipeline(flows: &FlowRegistry<AppError>) -> Result<(), FlowError> {
  flows.register(build_signin_pipeline()?);
  info!("Sign-in pipeline registered.");
  Ok(())
}
