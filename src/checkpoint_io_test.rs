//! Tests for checkpoint save/load and `FileCheckpointStore`.

use serde_json::json;

use crate::checkpoint_io::{FileCheckpointStore, load_checkpoint, save_checkpoint};
use crate::store::CheckpointStore;
use crate::types::CheckpointRecord;

fn record() -> CheckpointRecord {
  CheckpointRecord {
    input: json!({"item": "doc"}),
    resume_values: vec![json!("A")],
    last_emitted_index: 1,
    pending_interrupt: Some(json!({"question": "ship it?"})),
  }
}

#[test]
fn roundtrip_save_load() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("nested").join("run.json");
  save_checkpoint(&path, &record()).unwrap();
  assert!(path.exists());
  assert_eq!(load_checkpoint(&path).unwrap(), record());
}

#[test]
fn load_missing_file_returns_error() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("nonexistent.json");
  assert!(load_checkpoint(&path).is_err());
}

#[test]
fn load_invalid_json_returns_error() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("bad.json");
  std::fs::write(&path, "{not json").unwrap();
  assert!(matches!(
    load_checkpoint(&path),
    Err(crate::StoreError::Serde(_))
  ));
}

#[test]
fn path_for_is_distinct_and_filesystem_safe() {
  let store = FileCheckpointStore::new("/tmp/runs");
  let a = store.path_for("parent:child");
  let b = store.path_for("parent/child");
  assert_ne!(a, b);
  for p in [&a, &b] {
    let name = p.file_name().unwrap().to_str().unwrap();
    assert!(!name.contains(':') && !name.contains('/'));
    assert!(name.ends_with(".json"));
  }
}

#[tokio::test]
async fn file_store_save_load_clear() {
  let dir = tempfile::tempdir().unwrap();
  let store = FileCheckpointStore::new(dir.path());
  assert!(store.load("r1").await.unwrap().is_none());

  store.save("r1", record()).await.unwrap();
  assert_eq!(store.load("r1").await.unwrap(), Some(record()));

  store.clear("r1").await.unwrap();
  assert!(store.load("r1").await.unwrap().is_none());
  store.clear("r1").await.unwrap();
}

#[tokio::test]
async fn file_store_survives_new_instance() {
  let dir = tempfile::tempdir().unwrap();
  FileCheckpointStore::new(dir.path())
    .save("r1", record())
    .await
    .unwrap();
  let reopened = FileCheckpointStore::new(dir.path());
  assert_eq!(reopened.load("r1").await.unwrap(), Some(record()));
}

#[tokio::test]
async fn file_store_lists_runs_and_skips_foreign_files() {
  let dir = tempfile::tempdir().unwrap();
  let store = FileCheckpointStore::new(dir.path());
  store.save("b:child", record()).await.unwrap();
  store.save("a", record()).await.unwrap();
  std::fs::write(dir.path().join("README.txt"), "hi").unwrap();
  assert_eq!(store.list_runs().await.unwrap(), vec!["a", "b:child"]);
}

#[tokio::test]
async fn file_store_missing_dir_lists_nothing() {
  let dir = tempfile::tempdir().unwrap();
  let store = FileCheckpointStore::new(dir.path().join("absent"));
  assert!(store.list_runs().await.unwrap().is_empty());
}
