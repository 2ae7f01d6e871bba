//! Error types for `rollcall-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Unknown email, user id, or an empty student roster.
  #[error("{0}")]
  NotFound(String),

  /// Duplicate email or student ID, or a rejected repeat check-in.
  #[error("{0}")]
  Conflict(String),

  /// Wrong admin secret code.
  #[error("{0}")]
  Unauthorized(String),

  /// The face matcher rejected the presented image.
  #[error("{0}")]
  Unauthenticated(String),

  #[error("{0}")]
  InvalidInput(String),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("export error: {0}")]
  Export(String),
}

impl Error {
  /// Stable snake_case discriminator, suitable for machine consumers.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::NotFound(_) => "not_found",
      Self::Conflict(_) => "conflict",
      Self::Unauthorized(_) => "unauthorized",
      Self::Unauthenticated(_) => "unauthenticated",
      Self::InvalidInput(_) => "invalid_input",
      Self::Storage(_) => "storage",
      Self::Serialization(_) => "serialization",
      Self::Export(_) => "export",
    }
  }

  pub(crate) fn storage<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(e))
  }
}

impl From<csv::Error> for Error {
  fn from(e: csv::Error) -> Self { Self::Export(e.to_string()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
