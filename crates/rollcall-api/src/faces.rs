//! `POST /faces/verify`: run the matcher without recording anything.

use axum::{Json, extract::State};
use rollcall_core::{
  face::{FaceImage, FaceMatcher, Verification},
  store::SnapshotStore,
};
use serde::Deserialize;

use crate::{Directory, error::ApiError, extract::JsonBody};

/// A single captured frame.
#[derive(Debug, Deserialize)]
pub struct FaceBody {
  /// `data:image/<type>;base64,<payload>`
  pub image: String,
}

pub async fn verify<S, M>(
  State(dir): State<Directory<S, M>>,
  JsonBody(body): JsonBody<FaceBody>,
) -> Result<Json<Verification>, ApiError>
where
  S: SnapshotStore,
  M: FaceMatcher,
{
  let image = FaceImage::from_data_url(body.image)?;
  Ok(Json(dir.verify_face(&image).await))
}
