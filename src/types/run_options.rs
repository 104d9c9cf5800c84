//! Per-call run options: which run this is and where its checkpoints live.

use std::fmt;
use std::sync::Arc;

use crate::store::CheckpointStore;

/// Options for `stream` / `invoke`.
///
/// A run is persistent only when both `run_id` and `store` are set; otherwise it is
/// ephemeral and cannot be resumed.
#[derive(Clone, Default)]
pub struct RunOptions {
  /// Key of this run in the checkpoint store.
  pub run_id: Option<String>,
  /// Store holding the run's checkpoint.
  pub store: Option<Arc<dyn CheckpointStore>>,
}

impl RunOptions {
  pub fn new(run_id: impl Into<String>, store: Arc<dyn CheckpointStore>) -> Self {
    Self {
      run_id: Some(run_id.into()),
      store: Some(store),
    }
  }

  pub fn ephemeral() -> Self {
    Self::default()
  }

  pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
    self.run_id = Some(run_id.into());
    self
  }

  pub fn with_store(mut self, store: Arc<dyn CheckpointStore>) -> Self {
    self.store = Some(store);
    self
  }

  /// Run id and store, when the run can be checkpointed.
  pub fn persistence(&self) -> Option<(&str, &Arc<dyn CheckpointStore>)> {
    match (&self.run_id, &self.store) {
      (Some(id), Some(store)) => Some((id.as_str(), store)),
      _ => None,
    }
  }

  pub fn is_ephemeral(&self) -> bool {
    self.persistence().is_none()
  }

  /// Options for a child task `name` running beneath this run: `"{run_id}:{name}"` in the
  /// same store. An ephemeral parent yields an ephemeral child.
  pub fn scoped(&self, name: &str) -> Self {
    match self.persistence() {
      Some((id, store)) => Self::new(format!("{id}:{name}"), Arc::clone(store)),
      None => Self::ephemeral(),
    }
  }
}

impl fmt::Debug for RunOptions {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RunOptions")
      .field("run_id", &self.run_id)
      .field("store", &self.store.as_ref().map(|_| "<dyn CheckpointStore>"))
      .finish()
  }
}
