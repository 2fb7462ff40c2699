//! Error type for `bbs-store-sqlite`.

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

  /// A primary-key or unique constraint rejected an insert or update.
  #[error("duplicate {kind}: {message}")]
  Conflict { kind: &'static str, message: String },

  #[error("{kind} not found: {id}")]
  NotFound { kind: &'static str, id: Uuid },

  #[error("unknown column {column:?} on table {table}")]
  UnknownColumn { table: &'static str, column: String },

  #[error("cannot store {column}: {reason}")]
  Encode { column: &'static str, reason: String },

  #[error("malformed value in column {column}: {reason}")]
  Decode { column: &'static str, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for bbs_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Conflict { kind, message } => {
        bbs_core::Error::Conflict(format!("duplicate {kind}: {message}"))
      }
      Error::NotFound { kind, id } => bbs_core::Error::NotFound { kind, id },
      other => bbs_core::Error::Store(Box::new(other)),
    }
  }
}
