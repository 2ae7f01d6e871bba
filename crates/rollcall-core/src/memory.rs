//! [`MemoryStore`]: a process-local [`SnapshotStore`].

use std::{
  collections::HashMap,
  convert::Infallible,
  sync::{Arc, Mutex, PoisonError},
};

use crate::store::SnapshotStore;

/// Snapshots kept in a shared map. Nothing outlives the process.
///
/// Cloning is cheap and clones share the same documents, so a test can keep a
/// handle to inspect or tamper with what the directory wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  documents: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Read a document synchronously.
  pub fn get(&self, key: &str) -> Option<String> {
    self
      .documents
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .get(key)
      .cloned()
  }

  /// Write a document synchronously, bypassing any directory.
  pub fn put(&self, key: impl Into<String>, document: impl Into<String>) {
    self
      .documents
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(key.into(), document.into());
  }
}

impl SnapshotStore for MemoryStore {
  type Error = Infallible;

  async fn load(&self, key: &str) -> Result<Option<String>, Self::Error> {
    Ok(self.get(key))
  }

  async fn save(&self, key: &str, document: String) -> Result<(), Self::Error> {
    self.put(key, document);
    Ok(())
  }
}
