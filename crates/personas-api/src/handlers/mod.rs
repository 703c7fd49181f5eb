//! Request handlers.

pub mod login;
pub mod personas;

use axum::Json;
use serde_json::{Value, json};

/// `GET /health` — liveness probe, no auth.
pub async fn health() -> Json<Value> {
  Json(json!({ "status": "ok" }))
}
