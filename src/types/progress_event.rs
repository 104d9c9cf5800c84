//! Events yielded by a run's stream.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One observable step of a run: `(value, task, interrupt)`.
///
/// Progress points carry `value`; the terminal event of a paused run carries `interrupt`
/// instead. `task` names the task that produced the event when the engine is bound to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
  pub value: Option<Value>,
  pub task: Option<String>,
  pub interrupt: Option<Value>,
}

impl ProgressEvent {
  pub fn progress(value: Value, task: Option<String>) -> Self {
    Self {
      value: Some(value),
      task,
      interrupt: None,
    }
  }

  pub fn interrupted(payload: Value, task: Option<String>) -> Self {
    Self {
      value: None,
      task,
      interrupt: Some(payload),
    }
  }

  pub fn is_interrupt(&self) -> bool {
    self.interrupt.is_some()
  }
}
