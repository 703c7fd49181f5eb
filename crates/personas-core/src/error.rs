//! Error taxonomy for the Personas service.
//!
//! Transport adapters map these onto distinct HTTP status codes, so the
//! variants must stay distinguishable.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// A single failed check on one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field:   &'static str,
  pub message: String,
}

impl std::fmt::Display for FieldError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}: {}", self.field, self.message)
  }
}

#[derive(Debug, Error)]
pub enum Error {
  /// Input failed one or more field-level checks before reaching the store.
  #[error("validation failed: {0:?}")]
  Validation(Vec<FieldError>),

  /// Another person already holds this identification.
  #[error("a person with identification {identification:?} already exists")]
  Conflict { identification: String },

  /// The operation targeted a person that does not exist.
  #[error("person not found: {0}")]
  NotFound(Uuid),

  /// Backend failure. Never echoed verbatim to API callers.
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
