//! HTTP Basic-auth extractor and the fixed role-to-permission table.
//!
//! The gate runs before any term handler; the lifecycle manager itself never
//! re-checks roles.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use serde::Deserialize;

use crate::{AppState, error::ApiError};
use registrar_core::store::TermStore;

// ─── Roles ───────────────────────────────────────────────────────────────────

/// The caller's role, resolved from its account at authentication time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Teacher,
  Parent,
  Student,
}

impl Role {
  /// Create / update / delete terms — the administrative set.
  pub fn may_manage_terms(self) -> bool { matches!(self, Role::Admin) }

  /// Read terms — the staff/guardian set.
  pub fn may_view_terms(self) -> bool {
    matches!(self, Role::Admin | Role::Teacher | Role::Parent)
  }
}

// ─── Accounts ────────────────────────────────────────────────────────────────

/// One credential accepted by this server instance.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub role:          Role,
}

/// Credentials accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub accounts: Vec<Account>,
}

// ─── Verification ────────────────────────────────────────────────────────────

/// Verify Basic credentials against the account list; returns the matched
/// account's role.
pub fn verify_auth(
  headers: &HeaderMap,
  config: &AuthConfig,
) -> Result<Role, ApiError> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds =
    std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) =
    creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  let account = config
    .accounts
    .iter()
    .find(|a| a.username == username)
    .ok_or(ApiError::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&account.password_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(account.role)
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// The authenticated caller; present in a handler means Basic auth passed.
pub struct Caller(pub Role);

impl Caller {
  pub fn require_view(&self) -> Result<(), ApiError> {
    if self.0.may_view_terms() {
      Ok(())
    } else {
      Err(ApiError::Forbidden)
    }
  }

  pub fn require_manage(&self) -> Result<(), ApiError> {
    if self.0.may_manage_terms() {
      Ok(())
    } else {
      Err(ApiError::Forbidden)
    }
  }
}

impl<S> FromRequestParts<AppState<S>> for Caller
where
  S: TermStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let role = verify_auth(&parts.headers, &state.auth)?;
    Ok(Caller(role))
  }
}
