//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as ISO 8601
//! (`YYYY-MM-DD`), UUIDs as hyphenated lowercase strings, and the two enums
//! as their lowercase names.

use chrono::{DateTime, NaiveDate, Utc};
use registrar_core::term::{Term, TermOfYear, TermStatus};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Timestamps and dates ────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  s.parse().map_err(|e: chrono::ParseError| Error::DateParse(e.to_string()))
}

// ─── TermOfYear ──────────────────────────────────────────────────────────────

pub fn encode_term_of_year(t: TermOfYear) -> &'static str {
  match t {
    TermOfYear::First => "first",
    TermOfYear::Second => "second",
    TermOfYear::Third => "third",
  }
}

pub fn decode_term_of_year(s: &str) -> Result<TermOfYear> {
  match s {
    "first" => Ok(TermOfYear::First),
    "second" => Ok(TermOfYear::Second),
    "third" => Ok(TermOfYear::Third),
    other => Err(Error::UnknownTermOfYear(other.to_owned())),
  }
}

// ─── TermStatus ──────────────────────────────────────────────────────────────

pub fn encode_status(s: TermStatus) -> &'static str {
  match s {
    TermStatus::Active => "active",
    TermStatus::Inactive => "inactive",
  }
}

pub fn decode_status(s: &str) -> Result<TermStatus> {
  match s {
    "active" => Ok(TermStatus::Active),
    "inactive" => Ok(TermStatus::Inactive),
    other => Err(Error::UnknownStatus(other.to_owned())),
  }
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw strings read directly from a `terms` row.
pub struct RawTerm {
  pub term_id:             String,
  pub starts_on:           String,
  pub ends_on:             String,
  pub next_term_starts_on: Option<String>,
  pub days_open:           i64,
  pub session:             String,
  pub term:                String,
  pub status:              String,
  pub created_at:          String,
}

impl RawTerm {
  /// Column order must match the SELECT lists in `store.rs`.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      term_id:             row.get(0)?,
      starts_on:           row.get(1)?,
      ends_on:             row.get(2)?,
      next_term_starts_on: row.get(3)?,
      days_open:           row.get(4)?,
      session:             row.get(5)?,
      term:                row.get(6)?,
      status:              row.get(7)?,
      created_at:          row.get(8)?,
    })
  }

  pub fn into_term(self) -> Result<Term> {
    Ok(Term {
      term_id:             decode_uuid(&self.term_id)?,
      starts_on:           decode_date(&self.starts_on)?,
      ends_on:             decode_date(&self.ends_on)?,
      next_term_starts_on: self
        .next_term_starts_on
        .as_deref()
        .map(decode_date)
        .transpose()?,
      days_open:           self.days_open as u32,
      session:             self.session,
      term:                decode_term_of_year(&self.term)?,
      status:              decode_status(&self.status)?,
      created_at:          decode_dt(&self.created_at)?,
    })
  }
}
