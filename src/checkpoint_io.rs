//! Checkpoint save/load to a run directory (JSON), and a [CheckpointStore] on top of it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tracing::{debug, instrument};

use crate::error::StoreError;
use crate::store::CheckpointStore;
use crate::types::CheckpointRecord;

/// Extension of checkpoint files under a run directory.
pub const CHECKPOINT_EXTENSION: &str = "json";

/// Saves a checkpoint to `path` as JSON.
#[instrument(level = "trace", skip(path, record))]
pub fn save_checkpoint(path: &Path, record: &CheckpointRecord) -> Result<(), StoreError> {
  let json = serde_json::to_string_pretty(record)?;
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, json)?;
  Ok(())
}

/// Loads a checkpoint from `path`. Returns error if file is missing or invalid JSON.
#[instrument(level = "trace", skip(path))]
pub fn load_checkpoint(path: &Path) -> Result<CheckpointRecord, StoreError> {
  let bytes = std::fs::read(path)?;
  Ok(serde_json::from_slice(&bytes)?)
}

/// Durable store: one JSON file per run under `run_dir`.
///
/// File names are the URL-safe base64 of the run id, so any id (including the `:`-joined
/// ids of nested tasks) maps to a distinct, portable file name.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
  run_dir: PathBuf,
}

impl FileCheckpointStore {
  pub fn new(run_dir: impl Into<PathBuf>) -> Self {
    Self {
      run_dir: run_dir.into(),
    }
  }

  pub fn run_dir(&self) -> &Path {
    &self.run_dir
  }

  /// Path of the checkpoint file for `run_id`.
  pub fn path_for(&self, run_id: &str) -> PathBuf {
    let stem = URL_SAFE_NO_PAD.encode(run_id.as_bytes());
    self
      .run_dir
      .join(format!("{stem}.{CHECKPOINT_EXTENSION}"))
  }
}

/// Decodes a checkpoint file name back to its run id; `None` for foreign files.
fn run_id_from_file_name(name: &str) -> Option<String> {
  let stem = name.strip_suffix(&format!(".{CHECKPOINT_EXTENSION}"))?;
  let bytes = URL_SAFE_NO_PAD.decode(stem).ok()?;
  String::from_utf8(bytes).ok()
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
  async fn save(&self, run_id: &str, record: CheckpointRecord) -> Result<(), StoreError> {
    let path = self.path_for(run_id);
    debug!(run_id, path = %path.display(), "saving checkpoint");
    save_checkpoint(&path, &record)
  }

  async fn load(&self, run_id: &str) -> Result<Option<CheckpointRecord>, StoreError> {
    let path = self.path_for(run_id);
    if !path.exists() {
      return Ok(None);
    }
    load_checkpoint(&path).map(Some)
  }

  async fn clear(&self, run_id: &str) -> Result<(), StoreError> {
    match std::fs::remove_file(self.path_for(run_id)) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }

  async fn list_runs(&self) -> Result<Vec<String>, StoreError> {
    let entries = match std::fs::read_dir(&self.run_dir) {
      Ok(entries) => entries,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
      Err(e) => return Err(e.into()),
    };
    let mut ids = vec![];
    for entry in entries {
      let entry = entry?;
      if let Some(id) = entry.file_name().to_str().and_then(run_id_from_file_name) {
        ids.push(id);
      }
    }
    ids.sort();
    Ok(ids)
  }
}
