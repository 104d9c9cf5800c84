//! Tests for `CheckpointRecord`.

use serde_json::json;

use super::{CheckpointRecord, NOTHING_EMITTED};

#[test]
fn fresh_record_has_no_history() {
  let rec = CheckpointRecord::fresh(json!({"item": "doc"}));
  assert_eq!(rec.input, json!({"item": "doc"}));
  assert!(rec.resume_values.is_empty());
  assert_eq!(rec.last_emitted_index, NOTHING_EMITTED);
  assert!(!rec.is_paused());
}

#[test]
fn record_roundtrip_serde() {
  let rec = CheckpointRecord {
    input: json!(7),
    resume_values: vec![json!("A"), json!({"ok": true})],
    last_emitted_index: 2,
    pending_interrupt: Some(json!("approve?")),
  };
  let text = serde_json::to_string(&rec).unwrap();
  let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
  assert_eq!(parsed["last_emitted_index"], 2);
  assert_eq!(parsed["resume_values"], json!(["A", {"ok": true}]));
  assert_eq!(parsed["pending_interrupt"], "approve?");
  let back: CheckpointRecord = serde_json::from_str(&text).unwrap();
  assert_eq!(back, rec);
}

#[test]
fn missing_fields_fall_back_to_defaults() {
  let rec: CheckpointRecord = serde_json::from_str(r#"{"input": "x"}"#).unwrap();
  assert_eq!(rec, CheckpointRecord::fresh(json!("x")));
}

#[test]
fn completed_record_omits_pending_interrupt() {
  let rec = CheckpointRecord::fresh(json!(null));
  let parsed: serde_json::Value = serde_json::to_value(&rec).unwrap();
  assert!(parsed.get("pending_interrupt").is_none());
}
