//! Term — one academic period of a session.
//!
//! A session (e.g. the `"2024/2025"` school year) holds up to three terms,
//! one per [`TermOfYear`] value. At most one term in the whole store is
//! `Active` at any time; which one changes through the lifecycle operations
//! in [`crate::lifecycle`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Enumerations ────────────────────────────────────────────────────────────

/// Position of a term within its session. The ordering First → Second →
/// Third drives the ordinal-fallback step of successor resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermOfYear {
  First,
  Second,
  Third,
}

impl TermOfYear {
  /// The three positions in session order.
  pub const ORDER: [TermOfYear; 3] =
    [TermOfYear::First, TermOfYear::Second, TermOfYear::Third];

  /// The position immediately after this one, if any.
  pub fn following(self) -> Option<TermOfYear> {
    match self {
      TermOfYear::First => Some(TermOfYear::Second),
      TermOfYear::Second => Some(TermOfYear::Third),
      TermOfYear::Third => None,
    }
  }
}

/// Whether a term is the current one. Exclusivity is an invariant of the
/// store, not of this type: the status is per-record, and the lifecycle
/// operations keep at most one record `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermStatus {
  Active,
  Inactive,
}

impl TermStatus {
  pub fn is_active(self) -> bool { matches!(self, Self::Active) }
}

// ─── Term ────────────────────────────────────────────────────────────────────

/// One academic period. `(session, term)` pairs are unique across the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Term {
  pub term_id:             Uuid,
  pub starts_on:           NaiveDate,
  pub ends_on:             NaiveDate,
  /// Start date of the intended successor term — a date value, not a
  /// foreign key. Drives the date-chain step of successor resolution.
  pub next_term_starts_on: Option<NaiveDate>,
  /// Number of days school is open during the term.
  pub days_open:           u32,
  /// Session label, e.g. `"2024/2025"`.
  pub session:             String,
  pub term:                TermOfYear,
  pub status:              TermStatus,
  /// Server-assigned; never changes after creation.
  pub created_at:          DateTime<Utc>,
}

impl Term {
  /// Overwrite every field present in `patch`, leaving the rest untouched.
  pub fn apply(&mut self, patch: &TermPatch) {
    if let Some(d) = patch.starts_on {
      self.starts_on = d;
    }
    if let Some(d) = patch.ends_on {
      self.ends_on = d;
    }
    if let Some(d) = patch.next_term_starts_on {
      self.next_term_starts_on = Some(d);
    }
    if let Some(n) = patch.days_open {
      self.days_open = n;
    }
    if let Some(s) = &patch.session {
      self.session = s.clone();
    }
    if let Some(t) = patch.term {
      self.term = t;
    }
    if let Some(s) = patch.status {
      self.status = s;
    }
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::lifecycle::TermLifecycle::create`].
/// `term_id`, `status`, and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewTerm {
  pub starts_on:           NaiveDate,
  pub ends_on:             NaiveDate,
  pub next_term_starts_on: Option<NaiveDate>,
  /// When `None`, computed as the whole-day count from `starts_on` to
  /// `ends_on`. An explicit value always wins over the computed one.
  pub days_open:           Option<u32>,
  pub session:             String,
  pub term:                TermOfYear,
}

impl NewTerm {
  pub fn resolved_days_open(&self) -> u32 {
    self
      .days_open
      .unwrap_or_else(|| count_open_days(self.starts_on, self.ends_on))
  }
}

/// Whole days from `starts_on` to `ends_on`; zero when the range is inverted.
pub fn count_open_days(starts_on: NaiveDate, ends_on: NaiveDate) -> u32 {
  (ends_on - starts_on).num_days().max(0) as u32
}

/// Partial update for [`crate::lifecycle::TermLifecycle::update`]. Absent
/// fields are left untouched. A present `status` additionally triggers the
/// activation / cascade side effects described on the lifecycle manager.
#[derive(Debug, Clone, Default)]
pub struct TermPatch {
  pub starts_on:           Option<NaiveDate>,
  pub ends_on:             Option<NaiveDate>,
  pub next_term_starts_on: Option<NaiveDate>,
  pub days_open:           Option<u32>,
  pub session:             Option<String>,
  pub term:                Option<TermOfYear>,
  pub status:              Option<TermStatus>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
