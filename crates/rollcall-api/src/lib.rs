//! JSON REST API for Rollcall.
//!
//! Exposes an axum [`Router`] backed by an [`AttendanceDirectory`] over any
//! [`SnapshotStore`] and [`FaceMatcher`]. Sessions, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rollcall_api::api_router(directory.clone()))
//! ```

pub mod attendance;
pub mod auth;
pub mod error;
pub mod extract;
pub mod faces;
pub mod reports;
pub mod students;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use rollcall_core::{AttendanceDirectory, face::FaceMatcher, store::SnapshotStore};

pub use error::ApiError;

/// Handler state: the directory every route operates on.
pub(crate) type Directory<S, M> = Arc<AttendanceDirectory<S, M>>;

/// Build a fully-materialised API router for `directory`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, M>(directory: Arc<AttendanceDirectory<S, M>>) -> Router<()>
where
  S: SnapshotStore + 'static,
  M: FaceMatcher + 'static,
{
  Router::new()
    // Identities
    .route("/auth/login", post(auth::login::<S, M>))
    .route("/auth/register", post(auth::register::<S, M>))
    .route("/identities/{id}", get(students::get_identity::<S, M>))
    // Students
    .route("/students", get(students::list::<S, M>).post(students::create::<S, M>))
    .route("/students/{id}/attendance", get(students::attendance::<S, M>))
    .route("/students/{id}/stats", get(students::stats::<S, M>))
    // Faces and check-ins
    .route("/faces/verify", post(faces::verify::<S, M>))
    .route("/attendance", get(attendance::list::<S, M>))
    .route("/attendance/mark", post(attendance::mark::<S, M>))
    .route("/attendance/identify", post(attendance::identify::<S, M>))
    .route("/attendance/absences", post(attendance::absences::<S, M>))
    // Reports
    .route("/reports/daily", get(reports::daily::<S, M>))
    .route("/reports/range", get(reports::range::<S, M>))
    .route("/reports/export", get(reports::export::<S, M>))
    .with_state(directory)
}
