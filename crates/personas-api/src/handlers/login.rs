//! Handler for `POST /api/auth/login`.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::{self, Role},
  error::ApiError,
};
use personas_core::store::PersonStore;

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub token:    String,
  pub username: String,
  pub role:     Role,
  pub message:  String,
}

/// Checks the credentials against the directory and mints a bearer token.
/// Unknown user and wrong password are indistinguishable to the caller.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<LoginResponse>, ApiError>
where
  S: PersonStore + 'static,
{
  let credential = state
    .credentials
    .lookup(&body.username)
    .ok_or(ApiError::Unauthorized)?;

  if !auth::verify_password(&body.password, &credential.password_hash) {
    return Err(ApiError::Unauthorized);
  }

  let token = state
    .auth
    .issue(&body.username, credential.role)
    .map_err(|e| ApiError::Internal(Box::new(e)))?;

  Ok(Json(LoginResponse {
    token,
    username: body.username,
    role: credential.role,
    message: "login ok".to_owned(),
  }))
}
