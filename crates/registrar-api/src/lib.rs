//! JSON REST API for Registrar.
//!
//! Exposes an axum [`Router`] backed by any
//! [`registrar_core::store::TermStore`], with HTTP Basic authentication and
//! the fixed role-to-permission table in [`auth`] in front of every route.
//! TLS and transport concerns are the caller's responsibility.

pub mod auth;
pub mod error;
pub mod terms;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use registrar_core::{TermLifecycle, store::TermStore};

use auth::{Account, AuthConfig};

pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  pub accounts:   Vec<Account>,
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: TermStore> {
  pub lifecycle: Arc<TermLifecycle<S>>,
  pub auth:      Arc<AuthConfig>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: TermStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/terms", get(terms::list::<S>).post(terms::create::<S>))
    .route(
      "/terms/{id}",
      get(terms::get_one::<S>)
        .patch(terms::update_one::<S>)
        .delete(terms::delete_one::<S>),
    )
    .route("/terms/bulk-delete", post(terms::bulk_delete::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use rand_core::OsRng;
  use registrar_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use crate::auth::Role;

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();

    let hash = |password: &str| {
      let salt = SaltString::generate(&mut OsRng);
      Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string()
    };

    AppState {
      lifecycle: Arc::new(TermLifecycle::new(store)),
      auth:      Arc::new(AuthConfig {
        accounts: vec![
          Account {
            username:      "head".to_string(),
            password_hash: hash("secret"),
            role:          Role::Admin,
          },
          Account {
            username:      "jules".to_string(),
            password_hash: hash("secret"),
            role:          Role::Teacher,
          },
          Account {
            username:      "sam".to_string(),
            password_hash: hash("secret"),
            role:          Role::Student,
          },
        ],
      }),
    }
  }

  fn basic(user: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:secret")))
  }

  async fn send(
    state: &AppState<SqliteStore>,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
      builder = builder.header(header::AUTHORIZATION, basic(user));
    }
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    router(state.clone()).oneshot(req).await.unwrap()
  }

  async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn term_body(session: &str, term: &str, start: &str, end: &str) -> Value {
    json!({
      "starts_on": start,
      "ends_on": end,
      "session": session,
      "term": term,
    })
  }

  // ── Auth and roles ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn unauthenticated_requests_return_401() {
    let state = make_state().await;
    let resp = send(&state, "GET", "/terms", None, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn students_cannot_read_terms() {
    let state = make_state().await;
    let resp = send(&state, "GET", "/terms", Some("sam"), None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn teachers_can_read_but_not_create() {
    let state = make_state().await;

    let resp = send(&state, "GET", "/terms", Some("jules"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!([]));

    let resp = send(
      &state,
      "POST",
      "/terms",
      Some("jules"),
      Some(term_body("2024/2025", "first", "2024-09-09", "2024-12-13")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }

  // ── Create ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_returns_201_with_active_term() {
    let state = make_state().await;
    let resp = send(
      &state,
      "POST",
      "/terms",
      Some("head"),
      Some(term_body("2024/2025", "first", "2024-09-09", "2024-12-13")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let term = body_json(resp).await;
    assert_eq!(term["session"], "2024/2025");
    assert_eq!(term["term"], "first");
    assert_eq!(term["status"], "active");
    // 2024-09-09 → 2024-12-13 is 95 whole days.
    assert_eq!(term["days_open"], 95);
  }

  #[tokio::test]
  async fn duplicate_create_returns_409() {
    let state = make_state().await;
    send(
      &state,
      "POST",
      "/terms",
      Some("head"),
      Some(term_body("2024/2025", "first", "2024-09-09", "2024-12-13")),
    )
    .await;

    let resp = send(
      &state,
      "POST",
      "/terms",
      Some("head"),
      Some(term_body("2024/2025", "first", "2024-09-16", "2024-12-20")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
  }

  // ── Update ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn patch_unknown_term_returns_404() {
    let state = make_state().await;
    let resp = send(
      &state,
      "PATCH",
      &format!("/terms/{}", uuid::Uuid::new_v4()),
      Some("head"),
      Some(json!({ "days_open": 60 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn deactivation_and_takeover_over_http() {
    let state = make_state().await;

    let first = body_json(
      send(
        &state,
        "POST",
        "/terms",
        Some("head"),
        Some(term_body("2024/2025", "first", "2024-09-09", "2024-12-13")),
      )
      .await,
    )
    .await;
    let second = body_json(
      send(
        &state,
        "POST",
        "/terms",
        Some("head"),
        Some(term_body("2024/2025", "second", "2025-01-06", "2025-04-04")),
      )
      .await,
    )
    .await;

    // Deactivate the Second term; no Third exists and no date chain is set,
    // so the store rests with zero Active terms.
    let resp = send(
      &state,
      "PATCH",
      &format!("/terms/{}", second["term_id"].as_str().unwrap()),
      Some("head"),
      Some(json!({ "status": "inactive" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let terms =
      body_json(send(&state, "GET", "/terms", Some("head"), None).await).await;
    assert!(
      terms
        .as_array()
        .unwrap()
        .iter()
        .all(|t| t["status"] == "inactive")
    );

    // Reactivating the First term is an unconditional takeover.
    let resp = send(
      &state,
      "PATCH",
      &format!("/terms/{}", first["term_id"].as_str().unwrap()),
      Some("head"),
      Some(json!({ "status": "active" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "active");
  }

  // ── Delete ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_returns_204_then_404() {
    let state = make_state().await;
    let term = body_json(
      send(
        &state,
        "POST",
        "/terms",
        Some("head"),
        Some(term_body("2024/2025", "first", "2024-09-09", "2024-12-13")),
      )
      .await,
    )
    .await;
    let uri = format!("/terms/{}", term["term_id"].as_str().unwrap());

    let resp = send(&state, "DELETE", &uri, Some("head"), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(&state, "GET", &uri, Some("head"), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Bulk delete ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn bulk_delete_empty_list_returns_400() {
    let state = make_state().await;
    let resp = send(
      &state,
      "POST",
      "/terms/bulk-delete",
      Some("head"),
      Some(json!({ "ids": [] })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn bulk_delete_returns_count() {
    let state = make_state().await;
    let first = body_json(
      send(
        &state,
        "POST",
        "/terms",
        Some("head"),
        Some(term_body("2024/2025", "first", "2024-09-09", "2024-12-13")),
      )
      .await,
    )
    .await;
    let second = body_json(
      send(
        &state,
        "POST",
        "/terms",
        Some("head"),
        Some(term_body("2024/2025", "second", "2025-01-06", "2025-04-04")),
      )
      .await,
    )
    .await;

    let resp = send(
      &state,
      "POST",
      "/terms/bulk-delete",
      Some("head"),
      Some(json!({ "ids": [first["term_id"], second["term_id"]] })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({ "deleted": 2 }));
  }
}
