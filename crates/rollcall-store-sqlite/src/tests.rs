//! Integration tests for `SqliteSnapshotStore`.

use std::path::PathBuf;

use chrono::Utc;
use rollcall_core::{
  AttendanceDirectory,
  config::DirectoryConfig,
  identity::{Registration, Role},
  store::{ATTENDANCE_KEY, IDENTITIES_KEY, SnapshotStore},
};

use crate::SqliteSnapshotStore;

async fn store() -> SqliteSnapshotStore {
  SqliteSnapshotStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// A fresh database path under the system temp dir.
fn temp_db(name: &str) -> PathBuf {
  let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
  std::env::temp_dir().join(format!("rollcall-{name}-{}-{nanos}.db", std::process::id()))
}

// ─── Documents ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_key_loads_none() {
  let s = store().await;
  assert_eq!(s.load(IDENTITIES_KEY).await.unwrap(), None);
  assert_eq!(s.saved_at(IDENTITIES_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn save_then_load() {
  let s = store().await;
  s.save(IDENTITIES_KEY, "[1,2,3]".into()).await.unwrap();
  assert_eq!(s.load(IDENTITIES_KEY).await.unwrap().as_deref(), Some("[1,2,3]"));
  assert_eq!(s.load(ATTENDANCE_KEY).await.unwrap(), None, "keys are independent");
}

#[tokio::test]
async fn save_replaces_the_whole_document() {
  let s = store().await;
  let before = Utc::now();
  s.save(ATTENDANCE_KEY, "[\"old\"]".into()).await.unwrap();
  s.save(ATTENDANCE_KEY, "[]".into()).await.unwrap();

  assert_eq!(s.load(ATTENDANCE_KEY).await.unwrap().as_deref(), Some("[]"));
  let saved_at = s.saved_at(ATTENDANCE_KEY).await.unwrap().unwrap();
  // Stored at millisecond precision.
  assert!(saved_at >= before - chrono::Duration::milliseconds(1));
}

#[tokio::test]
async fn documents_survive_reopening_the_file() {
  let path = temp_db("reopen");
  {
    let s = SqliteSnapshotStore::open(&path).await.unwrap();
    s.save(IDENTITIES_KEY, "[\"kept\"]".into()).await.unwrap();
  }
  let s = SqliteSnapshotStore::open(&path).await.unwrap();
  assert_eq!(s.load(IDENTITIES_KEY).await.unwrap().as_deref(), Some("[\"kept\"]"));

  drop(s);
  let _ = std::fs::remove_file(&path);
}

// ─── Directory over SQLite ───────────────────────────────────────────────────

#[tokio::test]
async fn directory_state_persists_across_restarts() {
  let path = temp_db("directory");
  let config = DirectoryConfig { rng_seed: Some(7), ..DirectoryConfig::default() };

  let sam = {
    let store = SqliteSnapshotStore::open(&path).await.unwrap();
    let dir = AttendanceDirectory::open(store, config.clone()).await.unwrap();
    dir
      .register(Registration {
        name:        "Sam".into(),
        email:       "sam@x.com".into(),
        role:        Role::Student,
        secret_code: None,
      })
      .await
      .unwrap()
  };

  let store = SqliteSnapshotStore::open(&path).await.unwrap();
  let dir = AttendanceDirectory::open(store, config).await.unwrap();
  assert_eq!(dir.login("sam@x.com").await.unwrap(), sam);
  assert_eq!(dir.get_all_students().await.len(), 3);

  drop(dir);
  let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn unreadable_document_is_reseeded_in_place() {
  let s = store().await;
  s.save(IDENTITIES_KEY, "not json".into()).await.unwrap();

  let dir = AttendanceDirectory::open(s.clone(), DirectoryConfig::default())
    .await
    .unwrap();
  assert_eq!(dir.get_all_students().await.len(), 2);

  let stored = s.load(IDENTITIES_KEY).await.unwrap().unwrap();
  assert!(stored.starts_with('['));
  assert!(stored.contains("admin@faceauth.com"));
}
