//! The `SnapshotStore` trait and the fixed snapshot keys.
//!
//! The directory persists each collection as one whole JSON document. A
//! store only has to load and save opaque documents by key; it never sees the
//! domain types. Implemented by [`crate::memory::MemoryStore`] and by
//! `rollcall-store-sqlite`.

use std::future::Future;

/// Key of the identity collection snapshot.
pub const IDENTITIES_KEY: &str = "faceauth_users_db_v1";

/// Key of the attendance ledger snapshot.
pub const ATTENDANCE_KEY: &str = "faceauth_attendance_db_v1";

/// Durable key/value storage for whole-collection snapshots.
///
/// `save` must replace the document atomically: a reader observes either the
/// previous document or the new one, never a mix.
///
/// All methods return `Send` futures so the trait can be used behind a
/// multi-threaded runtime (e.g. tokio with `axum`).
pub trait SnapshotStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Return the document stored under `key`, or `None` if there is none.
  fn load<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Replace the document stored under `key`.
  fn save<'a>(
    &'a self,
    key: &'a str,
    document: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
