//! Error types for `bbs-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{kind} not found: {id}")]
  NotFound { kind: &'static str, id: Uuid },

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("validation error: {0}")]
  Validation(String),

  #[error("authentication required")]
  Unauthorized,

  #[error("invalid username or password")]
  InvalidCredentials,

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("password hashing error: {0}")]
  PasswordHash(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn not_found<E: crate::entity::Entity>(id: Uuid) -> Self {
    Self::NotFound { kind: E::KIND, id }
  }

  pub fn validation(msg: impl Into<String>) -> Self {
    Self::Validation(msg.into())
  }

  pub fn forbidden(msg: impl Into<String>) -> Self {
    Self::Forbidden(msg.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
