//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use personas_core::{Error as CoreError, FieldError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("validation failed")]
  Validation(Vec<FieldError>),

  /// Duplicate identification. Mapped to 400, matching the write endpoints'
  /// documented contract.
  #[error("{0}")]
  Conflict(String),

  #[error("not found: {0}")]
  NotFound(String),

  /// Missing, malformed, invalid, or expired bearer token.
  #[error("unauthorized")]
  Unauthorized,

  /// Valid token, insufficient role.
  #[error("forbidden")]
  Forbidden,

  /// Backend failure; logged server-side, never echoed to the caller.
  #[error("internal error")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<CoreError> for ApiError {
  fn from(err: CoreError) -> Self {
    match err {
      CoreError::Validation(fields) => ApiError::Validation(fields),
      CoreError::Conflict { identification } => ApiError::Conflict(format!(
        "a person with identification {identification:?} already exists"
      )),
      CoreError::NotFound(id) => {
        ApiError::NotFound(format!("person {id} not found"))
      }
      other => ApiError::Internal(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Validation(fields) => {
        let errors: Vec<String> =
          fields.iter().map(ToString::to_string).collect();
        (
          StatusCode::BAD_REQUEST,
          Json(json!({ "message": "invalid input", "errors": errors })),
        )
          .into_response()
      }
      ApiError::Conflict(msg) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": msg })))
          .into_response()
      }
      ApiError::NotFound(msg) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": msg })))
          .into_response()
      }
      ApiError::Unauthorized => (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "unauthorized" })),
      )
        .into_response(),
      ApiError::Forbidden => {
        (StatusCode::FORBIDDEN, Json(json!({ "error": "forbidden" })))
          .into_response()
      }
      ApiError::Internal(err) => {
        tracing::error!(error = %err, "request failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": "internal server error" })),
        )
          .into_response()
      }
    }
  }
}
