//! [`SqliteStore`] — the SQLite implementation of [`TermStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use registrar_core::{
  Error as CoreError, Result as CoreResult,
  store::TermStore,
  term::{NewTerm, Term, TermOfYear, TermStatus},
};

use crate::{
  Result,
  encode::{
    RawTerm, encode_date, encode_dt, encode_status, encode_term_of_year,
    encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Error mapping ───────────────────────────────────────────────────────────

fn storage(e: tokio_rusqlite::Error) -> CoreError {
  CoreError::Storage(Box::new(e))
}

fn is_unique_violation(e: &tokio_rusqlite::Error) -> bool {
  matches!(
    e,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(err, _))
      if err.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

/// Classify a write failure: a `(session, term)` uniqueness violation becomes
/// the core `DuplicateTerm` error, anything else stays opaque.
fn map_conflict(
  e: tokio_rusqlite::Error,
  session: &str,
  term: TermOfYear,
) -> CoreError {
  if is_unique_violation(&e) {
    CoreError::DuplicateTerm { session: session.to_owned(), term }
  } else {
    storage(e)
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Registrar term store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn query_one_term(
    &self,
    sql: &'static str,
    param: String,
  ) -> CoreResult<Option<Term>> {
    let raw: Option<RawTerm> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(sql, rusqlite::params![param], RawTerm::from_row)
            .optional()?,
        )
      })
      .await
      .map_err(storage)?;

    raw.map(RawTerm::into_term).transpose().map_err(Into::into)
  }
}

// ─── TermStore impl ──────────────────────────────────────────────────────────

impl TermStore for SqliteStore {
  async fn get_term(&self, id: Uuid) -> CoreResult<Option<Term>> {
    self
      .query_one_term(
        "SELECT term_id, starts_on, ends_on, next_term_starts_on, days_open,
                session, term, status, created_at
         FROM terms WHERE term_id = ?1",
        encode_uuid(id),
      )
      .await
  }

  async fn find_by_session_and_term(
    &self,
    session: &str,
    term: TermOfYear,
  ) -> CoreResult<Option<Term>> {
    let session = session.to_owned();
    let term_str = encode_term_of_year(term).to_owned();

    let raw: Option<RawTerm> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT term_id, starts_on, ends_on, next_term_starts_on,
                      days_open, session, term, status, created_at
               FROM terms WHERE session = ?1 AND term = ?2",
              rusqlite::params![session, term_str],
              RawTerm::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(storage)?;

    raw.map(RawTerm::into_term).transpose().map_err(Into::into)
  }

  async fn find_by_start_date(
    &self,
    starts_on: NaiveDate,
  ) -> CoreResult<Option<Term>> {
    self
      .query_one_term(
        "SELECT term_id, starts_on, ends_on, next_term_starts_on, days_open,
                session, term, status, created_at
         FROM terms WHERE starts_on = ?1 LIMIT 1",
        encode_date(starts_on),
      )
      .await
  }

  async fn list_terms(&self) -> CoreResult<Vec<Term>> {
    let raws: Vec<RawTerm> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT term_id, starts_on, ends_on, next_term_starts_on,
                  days_open, session, term, status, created_at
           FROM terms ORDER BY starts_on, created_at",
        )?;
        let rows = stmt
          .query_map([], RawTerm::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(storage)?;

    raws
      .into_iter()
      .map(|raw| raw.into_term().map_err(Into::into))
      .collect()
  }

  async fn insert_active_exclusive(
    &self,
    input: NewTerm,
  ) -> CoreResult<Term> {
    let term = Term {
      term_id:             Uuid::new_v4(),
      starts_on:           input.starts_on,
      ends_on:             input.ends_on,
      next_term_starts_on: input.next_term_starts_on,
      days_open:           input.resolved_days_open(),
      session:             input.session,
      term:                input.term,
      status:              TermStatus::Active,
      created_at:          Utc::now(),
    };

    let id_str      = encode_uuid(term.term_id);
    let starts_str  = encode_date(term.starts_on);
    let ends_str    = encode_date(term.ends_on);
    let next_str    = term.next_term_starts_on.map(encode_date);
    let days        = term.days_open as i64;
    let session_str = term.session.clone();
    let term_str    = encode_term_of_year(term.term).to_owned();
    let status_str  = encode_status(term.status).to_owned();
    let at_str      = encode_dt(term.created_at);

    self
      .conn
      .call(move |conn| {
        // One committed unit: a failed insert rolls the demotion back.
        let tx = conn.transaction()?;
        tx.execute("UPDATE terms SET status = 'inactive'", [])?;
        tx.execute(
          "INSERT INTO terms (
             term_id, starts_on, ends_on, next_term_starts_on, days_open,
             session, term, status, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str,
            starts_str,
            ends_str,
            next_str,
            days,
            session_str,
            term_str,
            status_str,
            at_str,
          ],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(|e| map_conflict(e, &term.session, term.term))?;

    Ok(term)
  }

  async fn save_term(&self, term: Term) -> CoreResult<()> {
    let id          = term.term_id;
    let id_str      = encode_uuid(term.term_id);
    let starts_str  = encode_date(term.starts_on);
    let ends_str    = encode_date(term.ends_on);
    let next_str    = term.next_term_starts_on.map(encode_date);
    let days        = term.days_open as i64;
    let session_str = term.session.clone();
    let term_str    = encode_term_of_year(term.term).to_owned();
    let status_str  = encode_status(term.status).to_owned();

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE terms
           SET starts_on = ?2, ends_on = ?3, next_term_starts_on = ?4,
               days_open = ?5, session = ?6, term = ?7, status = ?8
           WHERE term_id = ?1",
          rusqlite::params![
            id_str,
            starts_str,
            ends_str,
            next_str,
            days,
            session_str,
            term_str,
            status_str,
          ],
        )?)
      })
      .await
      .map_err(|e| map_conflict(e, &term.session, term.term))?;

    if changed == 0 {
      return Err(CoreError::TermNotFound(id));
    }
    Ok(())
  }

  async fn save_term_exclusive(&self, term: Term) -> CoreResult<()> {
    let id          = term.term_id;
    let id_str      = encode_uuid(term.term_id);
    let starts_str  = encode_date(term.starts_on);
    let ends_str    = encode_date(term.ends_on);
    let next_str    = term.next_term_starts_on.map(encode_date);
    let days        = term.days_open as i64;
    let session_str = term.session.clone();
    let term_str    = encode_term_of_year(term.term).to_owned();
    let status_str  = encode_status(term.status).to_owned();

    let changed: usize = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "UPDATE terms SET status = 'inactive' WHERE term_id != ?1",
          rusqlite::params![id_str],
        )?;
        let changed = tx.execute(
          "UPDATE terms
           SET starts_on = ?2, ends_on = ?3, next_term_starts_on = ?4,
               days_open = ?5, session = ?6, term = ?7, status = ?8
           WHERE term_id = ?1",
          rusqlite::params![
            id_str,
            starts_str,
            ends_str,
            next_str,
            days,
            session_str,
            term_str,
            status_str,
          ],
        )?;
        if changed == 0 {
          // Target row is gone; dropping the transaction rolls the
          // demotion back.
          return Ok(0);
        }
        tx.commit()?;
        Ok(changed)
      })
      .await
      .map_err(|e| map_conflict(e, &term.session, term.term))?;

    if changed == 0 {
      return Err(CoreError::TermNotFound(id));
    }
    Ok(())
  }

  async fn promote(&self, id: Uuid) -> CoreResult<()> {
    let id_str = encode_uuid(id);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("UPDATE terms SET status = 'inactive'", [])?;
        tx.execute(
          "UPDATE terms SET status = 'active' WHERE term_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(storage)
  }

  async fn delete_term(&self, id: Uuid) -> CoreResult<bool> {
    let id_str = encode_uuid(id);

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM terms WHERE term_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await
      .map_err(storage)?;

    Ok(changed > 0)
  }

  async fn delete_terms(&self, ids: Vec<Uuid>) -> CoreResult<u64> {
    if ids.is_empty() {
      return Ok(0);
    }

    let id_strs: Vec<String> = ids.into_iter().map(encode_uuid).collect();
    let placeholders: Vec<String> =
      (1..=id_strs.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
      "DELETE FROM terms WHERE term_id IN ({})",
      placeholders.join(", ")
    );

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(&sql, rusqlite::params_from_iter(id_strs.iter()))?)
      })
      .await
      .map_err(storage)?;

    Ok(changed as u64)
  }
}
