//! Handlers for `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/login` | Body: `{"email":"..."}`; 404 for unknown emails |
//! | `POST` | `/auth/register` | Body: [`RegisterBody`]; returns 201 + identity |
//!
//! There are no passwords. Logging in only resolves an email to an identity.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use rollcall_core::{
  face::FaceMatcher,
  identity::{Identity, Registration, Role},
  store::SnapshotStore,
};
use serde::Deserialize;

use crate::{Directory, error::ApiError, extract::JsonBody};

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email: String,
}

/// `POST /auth/login`
pub async fn login<S, M>(
  State(dir): State<Directory<S, M>>,
  JsonBody(body): JsonBody<LoginBody>,
) -> Result<Json<Identity>, ApiError>
where
  S: SnapshotStore,
  M: FaceMatcher,
{
  Ok(Json(dir.login(&body.email).await?))
}

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
  pub name:        String,
  pub email:       String,
  pub role:        Role,
  /// Only read when `role` is `ADMIN`.
  #[serde(default)]
  pub secret_code: Option<String>,
}

impl From<RegisterBody> for Registration {
  fn from(b: RegisterBody) -> Self {
    Registration {
      name:        b.name,
      email:       b.email,
      role:        b.role,
      secret_code: b.secret_code,
    }
  }
}

/// `POST /auth/register`
pub async fn register<S, M>(
  State(dir): State<Directory<S, M>>,
  JsonBody(body): JsonBody<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SnapshotStore,
  M: FaceMatcher,
{
  let identity = dir.register(body.into()).await?;
  Ok((StatusCode::CREATED, Json(identity)))
}
