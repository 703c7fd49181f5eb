//! Error type for `personas-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown data kind: {0:?}")]
  UnknownDataKind(String),

  /// UNIQUE-index violation on `identification` — the storage-level
  /// Conflict backstop.
  #[error("identification {0:?} is already taken")]
  IdentificationTaken(String),

  #[error("person not found: {0}")]
  PersonNotFound(Uuid),
}

impl From<Error> for personas_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::IdentificationTaken(identification) => {
        personas_core::Error::Conflict { identification }
      }
      Error::PersonNotFound(id) => personas_core::Error::NotFound(id),
      other => personas_core::Error::Storage(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
