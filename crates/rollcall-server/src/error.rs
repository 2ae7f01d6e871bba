//! Startup errors for the server library.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("store error: {0}")]
  Store(#[from] rollcall_store_sqlite::Error),

  #[error("directory error: {0}")]
  Directory(#[from] rollcall_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
