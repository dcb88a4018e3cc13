//! Error types for `registrar-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::term::TermOfYear;

#[derive(Debug, Error)]
pub enum Error {
  #[error("term not found: {0}")]
  TermNotFound(Uuid),

  #[error("term {term:?} of session {session} already exists")]
  DuplicateTerm { session: String, term: TermOfYear },

  #[error("no term ids given")]
  EmptyTermIdList,

  /// Persistence-layer failure not otherwise classified. Opaque to callers;
  /// the API layer logs the detail and never echoes it outward.
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
