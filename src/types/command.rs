//! Resume directive and the input a run is started with.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Resume directive: carries the value for the run's next unresolved suspension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
  pub resume: Value,
}

impl Command {
  pub fn resume(value: impl Into<Value>) -> Self {
    Self {
      resume: value.into(),
    }
  }
}

/// What a run is started with: a fresh input, or a command continuing a paused run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunInput {
  Fresh(Value),
  Resume(Command),
}

impl RunInput {
  pub fn is_resume(&self) -> bool {
    matches!(self, RunInput::Resume(_))
  }
}

impl From<Value> for RunInput {
  fn from(value: Value) -> Self {
    RunInput::Fresh(value)
  }
}

impl From<Command> for RunInput {
  fn from(cmd: Command) -> Self {
    RunInput::Resume(cmd)
  }
}
