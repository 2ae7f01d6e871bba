//! Handlers for `/students` and `/identities` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/identities/:id` | Admin or student; 404 if not found |
//! | `GET`  | `/students` | Registration order |
//! | `POST` | `/students` | Body: [`EnrollBody`]; returns 201 + identity |
//! | `GET`  | `/students/:id/attendance` | Newest first |
//! | `GET`  | `/students/:id/stats` | 404 if not found |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use rollcall_core::{
  attendance::AttendanceRecord,
  face::{FaceImage, FaceMatcher},
  identity::{Enrollment, Identity, IdentityId},
  store::SnapshotStore,
  summary::StudentStats,
};
use serde::Deserialize;

use crate::{Directory, error::ApiError, extract::JsonBody};

/// `GET /identities/:id`
pub async fn get_identity<S, M>(
  State(dir): State<Directory<S, M>>,
  Path(id): Path<String>,
) -> Result<Json<Identity>, ApiError>
where
  S: SnapshotStore,
  M: FaceMatcher,
{
  Ok(Json(dir.get_identity(&IdentityId::new(id)).await?))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /students`
pub async fn list<S, M>(State(dir): State<Directory<S, M>>) -> Json<Vec<Identity>>
where
  S: SnapshotStore,
  M: FaceMatcher,
{
  Json(dir.get_all_students().await)
}

// ─── Enroll ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollBody {
  pub name:       String,
  pub email:      String,
  pub student_id: String,
  pub department: String,
  /// `data:image/<type>;base64,<payload>`
  pub face_image: String,
}

/// `POST /students`
pub async fn create<S, M>(
  State(dir): State<Directory<S, M>>,
  JsonBody(body): JsonBody<EnrollBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SnapshotStore,
  M: FaceMatcher,
{
  let enrollment = Enrollment {
    face_image: FaceImage::from_data_url(body.face_image)?,
    name:       body.name,
    email:      body.email,
    student_id: body.student_id,
    department: body.department,
  };
  let identity = dir.add_student(enrollment).await?;
  Ok((StatusCode::CREATED, Json(identity)))
}

// ─── Per-student views ────────────────────────────────────────────────────────

/// `GET /students/:id/attendance`
pub async fn attendance<S, M>(
  State(dir): State<Directory<S, M>>,
  Path(id): Path<String>,
) -> Json<Vec<AttendanceRecord>>
where
  S: SnapshotStore,
  M: FaceMatcher,
{
  Json(dir.get_student_attendance(&IdentityId::new(id)).await)
}

/// `GET /students/:id/stats`
pub async fn stats<S, M>(
  State(dir): State<Directory<S, M>>,
  Path(id): Path<String>,
) -> Result<Json<StudentStats>, ApiError>
where
  S: SnapshotStore,
  M: FaceMatcher,
{
  Ok(Json(dir.student_stats(&IdentityId::new(id)).await?))
}
