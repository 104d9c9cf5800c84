//! Error taxonomy for runs and checkpoint stores.

use serde_json::Value;
use thiserror::Error;

/// Error type returned by step routines. Any `std::error::Error` (or a `&str` via `.into()`)
/// can be returned from a routine and reaches the caller unchanged.
pub type RoutineError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from [crate::CheckpointStore] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("checkpoint backend unavailable: {0}")]
  Backend(String),

  #[error("checkpoint io: {0}")]
  Io(#[from] std::io::Error),

  #[error("checkpoint (de)serialization: {0}")]
  Serde(#[from] serde_json::Error),
}

/// Errors surfaced by `stream` / `invoke`.
#[derive(Debug, Error)]
pub enum TaskError {
  /// `invoke` drained the run and it ended on an unresolved suspension.
  #[error("run interrupted without output (pending interrupt: {payload})")]
  InterruptedWithoutOutput { payload: Value },

  /// A resume command was given but there is nothing to resume.
  #[error("cannot resume run {}: {reason}", run_id.as_deref().unwrap_or("<ephemeral>"))]
  UnresolvedResumeTarget {
    run_id: Option<String>,
    reason: &'static str,
  },

  #[error(transparent)]
  Store(#[from] StoreError),

  /// Error returned by the step routine itself, passed through as-is.
  #[error(transparent)]
  Routine(RoutineError),
}

impl TaskError {
  /// Returns the step routine's own error when this is [TaskError::Routine].
  pub fn into_routine_error(self) -> Result<RoutineError, TaskError> {
    match self {
      TaskError::Routine(e) => Ok(e),
      other => Err(other),
    }
  }

  /// Converts into a [RoutineError], unwrapping [TaskError::Routine] so a routine that
  /// propagates a child's failure passes on the child's original error.
  pub fn into_boxed_routine_error(self) -> RoutineError {
    match self {
      TaskError::Routine(e) => e,
      other => Box::new(other),
    }
  }

  pub fn is_interrupted(&self) -> bool {
    matches!(self, TaskError::InterruptedWithoutOutput { .. })
  }
}
