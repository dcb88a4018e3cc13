//! Handlers for `/terms` endpoints.
//!
//! | Method   | Path                 | Notes |
//! |----------|----------------------|-------|
//! | `GET`    | `/terms`             | All terms, ordered by start date |
//! | `GET`    | `/terms/{id}`        | 404 if not found |
//! | `POST`   | `/terms`             | Body: [`CreateTermBody`]; 201, 409 on duplicate pair |
//! | `PATCH`  | `/terms/{id}`        | Body: [`UpdateTermBody`]; status changes cascade |
//! | `DELETE` | `/terms/{id}`        | 204; successor resolution runs after removal |
//! | `POST`   | `/terms/bulk-delete` | Body: `{"ids":[...]}`; 400 on empty list |
//!
//! Reads are open to the staff/guardian roles; every mutation requires the
//! administrative role.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use registrar_core::{
  store::TermStore,
  term::{NewTerm, Term, TermOfYear, TermPatch, TermStatus},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, auth::Caller, error::ApiError};

// ─── List / get ──────────────────────────────────────────────────────────────

/// `GET /terms`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
) -> Result<Json<Vec<Term>>, ApiError>
where
  S: TermStore + Clone + Send + Sync + 'static,
{
  caller.require_view()?;
  let terms = state.lifecycle.store().list_terms().await?;
  Ok(Json(terms))
}

/// `GET /terms/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Term>, ApiError>
where
  S: TermStore + Clone + Send + Sync + 'static,
{
  caller.require_view()?;
  let term = state
    .lifecycle
    .store()
    .get_term(id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("term {id} not found")))?;
  Ok(Json(term))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /terms`.
#[derive(Debug, Deserialize)]
pub struct CreateTermBody {
  pub starts_on:           NaiveDate,
  pub ends_on:             NaiveDate,
  pub next_term_starts_on: Option<NaiveDate>,
  /// Computed from the date range when omitted.
  pub days_open:           Option<u32>,
  pub session:             String,
  pub term:                TermOfYear,
}

impl From<CreateTermBody> for NewTerm {
  fn from(b: CreateTermBody) -> Self {
    NewTerm {
      starts_on:           b.starts_on,
      ends_on:             b.ends_on,
      next_term_starts_on: b.next_term_starts_on,
      days_open:           b.days_open,
      session:             b.session,
      term:                b.term,
    }
  }
}

/// `POST /terms` — returns 201 + the stored term, which is always the sole
/// `Active` one.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Json(body): Json<CreateTermBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TermStore + Clone + Send + Sync + 'static,
{
  caller.require_manage()?;
  let term = state.lifecycle.create(NewTerm::from(body)).await?;
  Ok((StatusCode::CREATED, Json(term)))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `PATCH /terms/{id}`. Absent fields are left
/// untouched; a present `status` triggers activation or cascade side effects.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTermBody {
  pub starts_on:           Option<NaiveDate>,
  pub ends_on:             Option<NaiveDate>,
  pub next_term_starts_on: Option<NaiveDate>,
  pub days_open:           Option<u32>,
  pub session:             Option<String>,
  pub term:                Option<TermOfYear>,
  pub status:              Option<TermStatus>,
}

impl From<UpdateTermBody> for TermPatch {
  fn from(b: UpdateTermBody) -> Self {
    TermPatch {
      starts_on:           b.starts_on,
      ends_on:             b.ends_on,
      next_term_starts_on: b.next_term_starts_on,
      days_open:           b.days_open,
      session:             b.session,
      term:                b.term,
      status:              b.status,
    }
  }
}

/// `PATCH /terms/{id}` — returns the updated term with all side effects
/// already committed.
pub async fn update_one<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateTermBody>,
) -> Result<Json<Term>, ApiError>
where
  S: TermStore + Clone + Send + Sync + 'static,
{
  caller.require_manage()?;
  let term = state.lifecycle.update(id, TermPatch::from(body)).await?;
  Ok(Json(term))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /terms/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TermStore + Clone + Send + Sync + 'static,
{
  caller.require_manage()?;
  state.lifecycle.delete(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Bulk delete ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct BulkDeleteBody {
  pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteResult {
  pub deleted: u64,
}

/// `POST /terms/bulk-delete` — body: `{"ids":[...]}`; returns the number of
/// terms removed.
pub async fn bulk_delete<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Json(body): Json<BulkDeleteBody>,
) -> Result<Json<BulkDeleteResult>, ApiError>
where
  S: TermStore + Clone + Send + Sync + 'static,
{
  caller.require_manage()?;
  let deleted = state.lifecycle.bulk_delete(&body.ids).await?;
  Ok(Json(BulkDeleteResult { deleted }))
}
