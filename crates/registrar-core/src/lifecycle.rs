//! The term lifecycle manager.
//!
//! Maintains the invariant that at most one term is `Active` at any time.
//! When a term leaves the `Active` state — by explicit deactivation or by
//! deletion — successor resolution picks which term (if any) becomes `Active`
//! in its place:
//!
//! 1. **Date chain** — a term whose start date equals the departing term's
//!    `next_term_starts_on` value.
//! 2. **Ordinal fallback** — the next [`TermOfYear`] position within the same
//!    session (for bulk deletion: the earliest position not among the deleted
//!    ones, searched in the first deleted term's session).
//!
//! When neither step matches, no term is activated and the store rests with
//! zero `Active` terms. That is a valid state, not an error.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  Error, Result,
  store::TermStore,
  term::{NewTerm, Term, TermOfYear, TermPatch, TermStatus},
};

// ─── Successor reference ─────────────────────────────────────────────────────

/// The fields of a departing term that successor resolution consults,
/// captured before the term is mutated or deleted.
#[derive(Debug, Clone)]
pub struct SuccessorRef {
  pub next_start: Option<NaiveDate>,
  pub session:    String,
  pub term:       TermOfYear,
}

impl From<&Term> for SuccessorRef {
  fn from(term: &Term) -> Self {
    Self {
      next_start: term.next_term_starts_on,
      session:    term.session.clone(),
      term:       term.term,
    }
  }
}

/// Earliest position in session order not present among `refs`.
fn remaining_term_of_year(refs: &[SuccessorRef]) -> Option<TermOfYear> {
  TermOfYear::ORDER
    .into_iter()
    .find(|toy| refs.iter().all(|r| r.term != *toy))
}

// ─── Manager ─────────────────────────────────────────────────────────────────

/// Lifecycle operations over a [`TermStore`] backend.
///
/// Each operation is atomic from the caller's point of view: the status-flip
/// sequences it issues are single committed units in the store, and an error
/// leaves no half-applied flip behind. Authorization is the caller's
/// responsibility — the manager assumes the role gate has already run.
#[derive(Clone)]
pub struct TermLifecycle<S> {
  store: S,
}

impl<S: TermStore> TermLifecycle<S> {
  pub fn new(store: S) -> Self { Self { store } }

  /// The underlying backend, for plain reads.
  pub fn store(&self) -> &S { &self.store }

  /// Create a term. The new term is always `Active` and every existing term
  /// is demoted to `Inactive` in the same committed unit.
  ///
  /// Fails with [`Error::DuplicateTerm`] when the `(session, term)` pair is
  /// already taken, leaving the store unchanged.
  pub async fn create(&self, input: NewTerm) -> Result<Term> {
    if let Some(existing) = self
      .store
      .find_by_session_and_term(&input.session, input.term)
      .await?
    {
      return Err(Error::DuplicateTerm {
        session: existing.session,
        term:    existing.term,
      });
    }
    self.store.insert_active_exclusive(input).await
  }

  /// Update a term. Plain field updates apply unconditionally; a `status`
  /// present in the patch additionally triggers side effects:
  ///
  /// - to `Active`: the target becomes the sole `Active` term (unconditional
  ///   takeover, no successor computation).
  /// - to `Inactive`: successor resolution runs on the *pre-update* term
  ///   fields, and the resolved successor (if any) is promoted after the
  ///   target's own row — including its new `Inactive` status — is written.
  ///
  /// The cascade runs whenever the patch carries `Inactive`, whether or not
  /// the target was `Active` beforehand.
  pub async fn update(&self, id: Uuid, patch: TermPatch) -> Result<Term> {
    let current = self
      .store
      .get_term(id)
      .await?
      .ok_or(Error::TermNotFound(id))?;

    // (session, term) collision check against the pair the patch produces.
    let session = patch.session.as_deref().unwrap_or(&current.session);
    let term = patch.term.unwrap_or(current.term);
    if (session, term) != (current.session.as_str(), current.term) {
      let other = self.store.find_by_session_and_term(session, term).await?;
      if other.is_some_and(|o| o.term_id != id) {
        return Err(Error::DuplicateTerm { session: session.to_owned(), term });
      }
    }

    let reference = SuccessorRef::from(&current);

    let mut updated = current;
    updated.apply(&patch);

    match patch.status {
      Some(TermStatus::Active) => {
        self.store.save_term_exclusive(updated).await?;
      }
      Some(TermStatus::Inactive) => {
        self.store.save_term(updated).await?;
        if let Some(successor) = self.resolve_single(&reference).await? {
          self.store.promote(successor.term_id).await?;
        }
      }
      None => self.store.save_term(updated).await?,
    }

    // Re-read so the result reflects every committed side effect.
    self
      .store
      .get_term(id)
      .await?
      .ok_or(Error::TermNotFound(id))
  }

  /// Delete a term, then run successor resolution on its captured fields.
  ///
  /// The cascade runs whether or not the deleted term was `Active`; a
  /// resolved successor is promoted either way.
  pub async fn delete(&self, id: Uuid) -> Result<()> {
    let term = self
      .store
      .get_term(id)
      .await?
      .ok_or(Error::TermNotFound(id))?;
    let reference = SuccessorRef::from(&term);

    if !self.store.delete_term(id).await? {
      return Err(Error::TermNotFound(id));
    }

    if let Some(successor) = self.resolve_single(&reference).await? {
      self.store.promote(successor.term_id).await?;
    }
    Ok(())
  }

  /// Delete several terms in one statement; returns the number of rows
  /// removed. Successor resolution considers the captured references in
  /// input order for the date-chain step; the ordinal fallback searches the
  /// *first* captured term's session for the earliest position not among the
  /// deleted ones.
  pub async fn bulk_delete(&self, ids: &[Uuid]) -> Result<u64> {
    if ids.is_empty() {
      return Err(Error::EmptyTermIdList);
    }

    let mut captured = Vec::with_capacity(ids.len());
    for id in ids {
      if let Some(term) = self.store.get_term(*id).await? {
        captured.push(SuccessorRef::from(&term));
      }
    }

    let count = self.store.delete_terms(ids.to_vec()).await?;

    if let Some(successor) = self.resolve_batch(&captured).await? {
      self.store.promote(successor.term_id).await?;
    }
    Ok(count)
  }

  // ── Successor resolution ──────────────────────────────────────────────────

  /// Date-chain step: the first reference whose `next_start` matches an
  /// existing term's start date wins.
  async fn find_by_next_start(
    &self,
    refs: &[SuccessorRef],
  ) -> Result<Option<Term>> {
    for r in refs {
      let Some(start) = r.next_start else { continue };
      if let Some(term) = self.store.find_by_start_date(start).await? {
        return Ok(Some(term));
      }
    }
    Ok(None)
  }

  async fn resolve_single(&self, r: &SuccessorRef) -> Result<Option<Term>> {
    if let Some(term) =
      self.find_by_next_start(std::slice::from_ref(r)).await?
    {
      return Ok(Some(term));
    }
    let Some(next) = r.term.following() else {
      return Ok(None);
    };
    self.store.find_by_session_and_term(&r.session, next).await
  }

  async fn resolve_batch(
    &self,
    refs: &[SuccessorRef],
  ) -> Result<Option<Term>> {
    if let Some(term) = self.find_by_next_start(refs).await? {
      return Ok(Some(term));
    }
    let Some(first) = refs.first() else {
      return Ok(None);
    };
    let Some(candidate) = remaining_term_of_year(refs) else {
      return Ok(None);
    };
    self
      .store
      .find_by_session_and_term(&first.session, candidate)
      .await
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
