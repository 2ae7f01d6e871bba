//! [`SqliteSnapshotStore`]: the SQLite implementation of [`SnapshotStore`].

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::OptionalExtension as _;

use rollcall_core::store::SnapshotStore;

use crate::{Error, Result, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Rollcall snapshots kept in a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteSnapshotStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteSnapshotStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "sqlite snapshot store opened");
    Ok(store)
  }

  /// Open an in-memory store; nothing survives the connection.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// When the document under `key` was last written, if it exists.
  pub async fn saved_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
    let key_str = key.to_owned();
    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT saved_at FROM snapshots WHERE key = ?1",
            rusqlite::params![key_str],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;

    raw
      .map(|s| {
        DateTime::parse_from_rfc3339(&s)
          .map(|dt| dt.with_timezone(&Utc))
          .map_err(|source| Error::Timestamp { key: key.to_owned(), source })
      })
      .transpose()
  }
}

// ─── SnapshotStore impl ──────────────────────────────────────────────────────

impl SnapshotStore for SqliteSnapshotStore {
  type Error = Error;

  async fn load(&self, key: &str) -> Result<Option<String>> {
    let key_str = key.to_owned();
    let document = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT document FROM snapshots WHERE key = ?1",
            rusqlite::params![key_str],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;
    Ok(document)
  }

  async fn save(&self, key: &str, document: String) -> Result<()> {
    let key_str = key.to_owned();
    let at_str = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let len = document.len();

    // A single upsert statement, so readers see the old or the new document.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO snapshots (key, document, saved_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(key) DO UPDATE SET document = excluded.document,
                                          saved_at = excluded.saved_at",
          rusqlite::params![key_str, document, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::trace!(key, bytes = len, "snapshot saved");
    Ok(())
  }
}
