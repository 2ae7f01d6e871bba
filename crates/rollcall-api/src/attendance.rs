//! Handlers for `/attendance` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/attendance` | Optional `?date=YYYY-MM-DD`; newest first |
//! | `POST` | `/attendance/mark` | Body: `{"userId":"..","image":".."}`; returns 201 + record |
//! | `POST` | `/attendance/identify` | Body: `{"image":".."}`; returns 201 + `{record, user}` |
//! | `POST` | `/attendance/absences` | Optional body `{"date":"YYYY-MM-DD"}`; date defaults to today |

use axum::{
  Json,
  body::Bytes,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use rollcall_core::{
  attendance::AttendanceRecord,
  face::{FaceImage, FaceMatcher},
  identity::IdentityId,
  store::SnapshotStore,
};
use serde::Deserialize;

use crate::{
  Directory,
  error::ApiError,
  extract::{JsonBody, QueryParams},
  faces::FaceBody,
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Restrict to rows attributed to this day.
  pub date: Option<NaiveDate>,
}

/// `GET /attendance[?date=<date>]`
pub async fn list<S, M>(
  State(dir): State<Directory<S, M>>,
  QueryParams(params): QueryParams<ListParams>,
) -> Json<Vec<AttendanceRecord>>
where
  S: SnapshotStore,
  M: FaceMatcher,
{
  let records = match params.date {
    Some(date) => dir.get_attendance_on(date).await,
    None => dir.get_all_attendance().await,
  };
  Json(records)
}

// ─── Check-ins ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkBody {
  pub user_id: String,
  /// `data:image/<type>;base64,<payload>`
  pub image:   String,
}

/// `POST /attendance/mark`
pub async fn mark<S, M>(
  State(dir): State<Directory<S, M>>,
  JsonBody(body): JsonBody<MarkBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SnapshotStore,
  M: FaceMatcher,
{
  let image = FaceImage::from_data_url(body.image)?;
  let record = dir.mark_attendance(&IdentityId::new(body.user_id), &image).await?;
  Ok((StatusCode::CREATED, Json(record)))
}

/// `POST /attendance/identify`: the kiosk flow.
pub async fn identify<S, M>(
  State(dir): State<Directory<S, M>>,
  JsonBody(body): JsonBody<FaceBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SnapshotStore,
  M: FaceMatcher,
{
  let image = FaceImage::from_data_url(body.image)?;
  let identification = dir.identify_and_mark_attendance(&image).await?;
  Ok((StatusCode::CREATED, Json(identification)))
}

// ─── Absences ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct AbsenceBody {
  #[serde(default)]
  pub date: Option<NaiveDate>,
}

/// `POST /attendance/absences`
pub async fn absences<S, M>(
  State(dir): State<Directory<S, M>>,
  body: Bytes,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError>
where
  S: SnapshotStore,
  M: FaceMatcher,
{
  // An empty body means "today".
  let body: AbsenceBody = if body.iter().all(u8::is_ascii_whitespace) {
    AbsenceBody::default()
  } else {
    serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?
  };
  let date = body.date.unwrap_or_else(|| dir.today());
  Ok(Json(dir.record_absences(date).await?))
}
