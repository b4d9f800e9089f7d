//! Error types for `studienplaner-core`.

use thiserror::Error;

/// The failure categories a caller can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NotFound,
  Forbidden,
  InvalidState,
  Conflict,
  Store,
}

#[derive(Debug, Error)]
pub enum Error {
  /// An id, email, or role query resolved to nothing where existence was
  /// required.
  #[error("not found: {0}")]
  NotFound(String),

  /// The access evaluator denied the requested operation.
  #[error("forbidden: {0}")]
  Forbidden(String),

  /// A collection the store must provide was absent rather than empty.
  #[error("invalid state: {0}")]
  InvalidState(String),

  /// A uniqueness violation reported by the store.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::NotFound(_) => ErrorKind::NotFound,
      Self::Forbidden(_) => ErrorKind::Forbidden,
      Self::InvalidState(_) => ErrorKind::InvalidState,
      Self::Conflict(_) => ErrorKind::Conflict,
      Self::Store(_) => ErrorKind::Store,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
