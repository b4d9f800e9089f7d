//! Error type for `studienplaner-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] studienplaner_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A column held a value no domain type accepts.
  #[error("decode error: {0}")]
  Decode(String),
}

impl Error {
  /// Whether this is a violated UNIQUE constraint (e.g. a duplicate email).
  pub fn is_unique_violation(&self) -> bool {
    matches!(
      self,
      Error::Database(tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _)))
        if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
  }
}

impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self { Error::Database(e.into()) }
}

impl From<Error> for studienplaner_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(inner) => inner,
      e if e.is_unique_violation() => studienplaner_core::Error::Conflict(e.to_string()),
      other => studienplaner_core::Error::Store(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
