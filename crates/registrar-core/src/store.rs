//! The `TermStore` trait — the persistence contract of the lifecycle manager.
//!
//! The trait is implemented by storage backends (e.g. `registrar-store-sqlite`).
//! The lifecycle manager and the API layer depend on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  Result,
  term::{NewTerm, Term, TermOfYear},
};

/// Abstraction over a term store backend.
///
/// The three status-flip operations (`insert_active_exclusive`,
/// `save_term_exclusive`, `promote`) must each commit as a single unit, so
/// that the at-most-one-`Active` invariant is never durably violated — a
/// failure mid-flip must leave the store as it was.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait TermStore: Send + Sync {
  /// Retrieve a term by id. Returns `None` if not found.
  fn get_term(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Term>>> + Send + '_;

  /// Look up the term holding a `(session, term)` pair. At most one exists
  /// (enforced by a UNIQUE constraint).
  fn find_by_session_and_term<'a>(
    &'a self,
    session: &'a str,
    term: TermOfYear,
  ) -> impl Future<Output = Result<Option<Term>>> + Send + 'a;

  /// Look up a term by its start date. Start dates are not unique; the first
  /// match in insertion order is returned.
  fn find_by_start_date(
    &self,
    starts_on: NaiveDate,
  ) -> impl Future<Output = Result<Option<Term>>> + Send + '_;

  /// All terms, ordered by start date.
  fn list_terms(&self) -> impl Future<Output = Result<Vec<Term>>> + Send + '_;

  /// Persist a new term with `Active` status while demoting every existing
  /// term to `Inactive`, in one committed unit. The store assigns the id and
  /// creation timestamp. Fails with [`crate::Error::DuplicateTerm`] when the
  /// `(session, term)` pair is taken.
  fn insert_active_exclusive(
    &self,
    input: NewTerm,
  ) -> impl Future<Output = Result<Term>> + Send + '_;

  /// Overwrite the stored row for `term.term_id` with `term`'s fields.
  /// Fails with [`crate::Error::TermNotFound`] if the row is gone and with
  /// [`crate::Error::DuplicateTerm`] on a `(session, term)` collision.
  fn save_term(
    &self,
    term: Term,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// As [`TermStore::save_term`], but additionally demote every *other* term
  /// to `Inactive` in the same committed unit. Used when an update makes a
  /// term the sole `Active` one.
  fn save_term_exclusive(
    &self,
    term: Term,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// Demote every term to `Inactive`, then mark `id` `Active`, in one
  /// committed unit.
  fn promote(&self, id: Uuid) -> impl Future<Output = Result<()>> + Send + '_;

  /// Delete a term by id. Returns `false` if no row matched.
  fn delete_term(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool>> + Send + '_;

  /// Delete every term in `ids` with one statement; returns the number of
  /// rows removed.
  fn delete_terms(
    &self,
    ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<u64>> + Send + '_;
}
