//! Pluggable checkpoint storage keyed by run id.
//!
//! The engine reads a run's record when a call starts and writes the complete next
//! record whenever the run pauses or completes. Stores only need last-write-wins per key;
//! no coordination across keys is required.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::instrument;

use crate::error::StoreError;
use crate::types::CheckpointRecord;

/// Storage backend for [CheckpointRecord]s.
///
/// Contract:
/// * `save` replaces the record for `run_id` wholesale.
/// * `load` returns `Ok(None)` when no record exists.
/// * Calls on distinct keys may run concurrently.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
  async fn save(&self, run_id: &str, record: CheckpointRecord) -> Result<(), StoreError>;

  async fn load(&self, run_id: &str) -> Result<Option<CheckpointRecord>, StoreError>;

  /// Remove the record for `run_id`. Backends without removal may keep the default no-op.
  async fn clear(&self, _run_id: &str) -> Result<(), StoreError> {
    Ok(())
  }

  /// Run ids with a stored record.
  async fn list_runs(&self) -> Result<Vec<String>, StoreError> {
    Ok(vec![])
  }
}

/// Process-local store: a keyed map, no eviction.
#[derive(Debug, Default)]
pub struct InMemoryCheckpointStore {
  inner: RwLock<HashMap<String, CheckpointRecord>>,
}

impl InMemoryCheckpointStore {
  pub fn new() -> Self {
    Self::default()
  }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> StoreError {
  StoreError::Backend(format!("lock poisoned: {e}"))
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
  #[instrument(level = "trace", skip(self, record))]
  async fn save(&self, run_id: &str, record: CheckpointRecord) -> Result<(), StoreError> {
    let mut map = self.inner.write().map_err(poisoned)?;
    map.insert(run_id.to_string(), record);
    Ok(())
  }

  #[instrument(level = "trace", skip(self))]
  async fn load(&self, run_id: &str) -> Result<Option<CheckpointRecord>, StoreError> {
    let map = self.inner.read().map_err(poisoned)?;
    Ok(map.get(run_id).cloned())
  }

  #[instrument(level = "trace", skip(self))]
  async fn clear(&self, run_id: &str) -> Result<(), StoreError> {
    let mut map = self.inner.write().map_err(poisoned)?;
    map.remove(run_id);
    Ok(())
  }

  async fn list_runs(&self) -> Result<Vec<String>, StoreError> {
    let map = self.inner.read().map_err(poisoned)?;
    Ok(map.keys().cloned().collect())
  }
}
