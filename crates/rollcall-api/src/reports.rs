//! Handlers for `/reports` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/reports/daily` | Optional `?date=`; defaults to today |
//! | `GET`  | `/reports/range` | `?from=&to=` required, inclusive |
//! | `GET`  | `/reports/export` | Optional `?date=`; `text/csv` attachment |

use axum::{
  Json,
  extract::State,
  http::header,
  response::IntoResponse,
};
use chrono::NaiveDate;
use rollcall_core::{face::FaceMatcher, store::SnapshotStore, summary::DaySummary};
use serde::Deserialize;

use crate::{
  Directory,
  error::ApiError,
  extract::QueryParams,
};

#[derive(Debug, Deserialize)]
pub struct DayParams {
  pub date: Option<NaiveDate>,
}

/// `GET /reports/daily[?date=<date>]`
pub async fn daily<S, M>(
  State(dir): State<Directory<S, M>>,
  QueryParams(params): QueryParams<DayParams>,
) -> Json<DaySummary>
where
  S: SnapshotStore,
  M: FaceMatcher,
{
  let date = params.date.unwrap_or_else(|| dir.today());
  Json(dir.daily_summary(date).await)
}

#[derive(Debug, Deserialize)]
pub struct RangeParams {
  pub from: NaiveDate,
  pub to:   NaiveDate,
}

/// `GET /reports/range?from=<date>&to=<date>`
pub async fn range<S, M>(
  State(dir): State<Directory<S, M>>,
  QueryParams(params): QueryParams<RangeParams>,
) -> Result<Json<Vec<DaySummary>>, ApiError>
where
  S: SnapshotStore,
  M: FaceMatcher,
{
  Ok(Json(dir.summary_range(params.from, params.to).await?))
}

/// `GET /reports/export[?date=<date>]`
pub async fn export<S, M>(
  State(dir): State<Directory<S, M>>,
  QueryParams(params): QueryParams<DayParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SnapshotStore,
  M: FaceMatcher,
{
  let csv = dir.export_csv(params.date).await?;
  let filename = match params.date {
    Some(date) => format!("attendance-{date}.csv"),
    None => "attendance-all.csv".to_owned(),
  };
  Ok((
    [
      (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
      (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
    ],
    csv,
  ))
}
