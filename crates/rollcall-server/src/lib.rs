//! HTTP hosting for Rollcall.
//!
//! Opens the SQLite snapshot store, builds the [`AttendanceDirectory`], and
//! mounts the JSON API under `/api`.

pub mod error;

pub use error::{Error, Result};

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use rollcall_core::{AttendanceDirectory, config::DirectoryConfig};
use rollcall_store_sqlite::SqliteSnapshotStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

/// `store_path` value that keeps everything in memory.
pub const IN_MEMORY: &str = ":memory:";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ROLLCALL_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  /// SQLite file holding the snapshots, or `:memory:`.
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default)]
  pub directory:  DirectoryConfig,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 3000 }

fn default_store_path() -> PathBuf { PathBuf::from("rollcall.db") }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       default_host(),
      port:       default_port(),
      store_path: default_store_path(),
      directory:  DirectoryConfig::default(),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Application state ────────────────────────────────────────────────────────

/// The directory as served: SQLite-backed, simulated matcher.
pub type Directory = AttendanceDirectory<SqliteSnapshotStore>;

/// Open the store named by `config.store_path` and load the directory from it.
pub async fn open_directory(config: &ServerConfig) -> Result<Directory> {
  let store = if config.store_path.as_os_str() == IN_MEMORY {
    tracing::warn!("using an in-memory store; nothing will be persisted");
    SqliteSnapshotStore::open_in_memory().await?
  } else {
    SqliteSnapshotStore::open(&config.store_path).await?
  };
  Ok(AttendanceDirectory::open(store, config.directory.clone()).await?)
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router: `/health` plus the API under `/api`.
pub fn router(directory: Arc<Directory>) -> Router {
  Router::new()
    .route("/health", get(|| async { "ok" }))
    .nest("/api", rollcall_api::api_router(directory))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use tower::ServiceExt as _;

  fn in_memory_config() -> ServerConfig {
    ServerConfig {
      store_path: PathBuf::from(IN_MEMORY),
      directory: DirectoryConfig { rng_seed: Some(1), ..DirectoryConfig::default() },
      ..ServerConfig::default()
    }
  }

  async fn app() -> Router {
    let directory = open_directory(&in_memory_config()).await.unwrap();
    router(Arc::new(directory))
  }

  async fn get_uri(app: Router, uri: &str) -> axum::response::Response {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(req).await.unwrap()
  }

  #[tokio::test]
  async fn health_is_ok() {
    let resp = get_uri(app().await, "/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn api_is_nested_under_prefix() {
    let resp = get_uri(app().await, "/api/students").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let students: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(students.as_array().unwrap().len(), 2);

    let resp = get_uri(app().await, "/students").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[test]
  fn config_fills_in_defaults() {
    let settings = config::Config::builder()
      .add_source(config::File::from_str(
        "port = 8080\n[directory]\nlate_after_hour = 8\n",
        config::FileFormat::Toml,
      ))
      .build()
      .unwrap();
    let cfg: ServerConfig = settings.try_deserialize().unwrap();

    assert_eq!(cfg.address(), "127.0.0.1:8080");
    assert_eq!(cfg.store_path, PathBuf::from("rollcall.db"));
    assert_eq!(cfg.directory.late_after_hour, 8);
    assert_eq!(cfg.directory.admin_secret, "Vsvg@admin");
  }

  #[tokio::test]
  async fn invalid_directory_config_fails_to_open() {
    let mut cfg = in_memory_config();
    cfg.directory.admin_secret = String::new();
    assert!(matches!(open_directory(&cfg).await, Err(Error::Directory(_))));
  }
}
