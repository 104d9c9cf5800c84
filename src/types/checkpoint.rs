//! Checkpoint record for resumable runs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `last_emitted_index` of a run that has not emitted any progress yet.
pub const NOTHING_EMITTED: i64 = -1;

/// Persisted state of one run: enough to re-execute the step routine and fast-forward
/// through everything it already did.
///
/// Always written whole; a later save replaces the earlier record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointRecord {
  /// Input the run was originally started with.
  pub input: Value,
  /// Values supplied by resume commands, in suspension order.
  #[serde(default)]
  pub resume_values: Vec<Value>,
  /// Index of the last progress point handed to a caller.
  #[serde(default = "nothing_emitted")]
  pub last_emitted_index: i64,
  /// Payload of the suspension the run is paused on; `None` once the run completed.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pending_interrupt: Option<Value>,
}

fn nothing_emitted() -> i64 {
  NOTHING_EMITTED
}

impl CheckpointRecord {
  /// Record for a run that has neither emitted nor been resumed.
  pub fn fresh(input: Value) -> Self {
    Self {
      input,
      resume_values: vec![],
      last_emitted_index: NOTHING_EMITTED,
      pending_interrupt: None,
    }
  }

  pub fn is_paused(&self) -> bool {
    self.pending_interrupt.is_some()
  }
}
