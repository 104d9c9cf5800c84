//! Tests for `ProgressEvent`.

use serde_json::json;

use super::ProgressEvent;

#[test]
fn progress_event_has_no_interrupt() {
  let ev = ProgressEvent::progress(json!(3), Some("count".to_string()));
  assert_eq!(ev.value, Some(json!(3)));
  assert_eq!(ev.task.as_deref(), Some("count"));
  assert!(!ev.is_interrupt());
}

#[test]
fn interrupt_event_has_no_value() {
  let ev = ProgressEvent::interrupted(json!({"question": "ok?"}), None);
  assert!(ev.is_interrupt());
  assert!(ev.value.is_none());
  assert_eq!(ev.interrupt, Some(json!({"question": "ok?"})));
}

#[test]
fn null_progress_is_still_progress() {
  let ev = ProgressEvent::progress(json!(null), None);
  assert_eq!(ev.value, Some(json!(null)));
  assert!(!ev.is_interrupt());
}
