//! Error type for `registrar-store-sqlite`.

use thiserror::Error;

/// Decode-side failures local to this crate. Surfaced to callers as the core
/// `Storage` taxonomy entry — except for uniqueness violations, which the
/// store maps to `DuplicateTerm` at the call site where the colliding pair
/// is known.
#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown term-of-year value: {0:?}")]
  UnknownTermOfYear(String),

  #[error("unknown status value: {0:?}")]
  UnknownStatus(String),
}

impl From<Error> for registrar_core::Error {
  fn from(e: Error) -> Self { registrar_core::Error::Storage(Box::new(e)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
