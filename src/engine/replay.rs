//! Replay cursors shared between a run's driver and its [super::StepContext].

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::{debug, trace};

use crate::types::CheckpointRecord;

/// Progress and suspension cursors of one run, plus the hand-off slots the driver drains.
#[derive(Debug)]
pub(crate) struct ReplayCursor {
  resume_values: Vec<Value>,
  next_suspension: usize,
  next_progress: i64,
  last_emitted: i64,
  emitted: VecDeque<Value>,
  pending: Option<Value>,
}

impl ReplayCursor {
  pub(crate) fn from_record(record: &CheckpointRecord) -> Self {
    Self {
      resume_values: record.resume_values.clone(),
      next_suspension: 0,
      next_progress: 0,
      last_emitted: record.last_emitted_index,
      emitted: VecDeque::new(),
      pending: None,
    }
  }

  /// Counts one progress point. Returns `true` when it is new and was queued for the caller,
  /// `false` when it was already emitted by an earlier call and is replayed silently.
  pub(crate) fn record_progress(&mut self, value: Value) -> bool {
    let index = self.next_progress;
    self.next_progress += 1;
    if index <= self.last_emitted {
      trace!(index, "replaying emitted progress");
      return false;
    }
    self.last_emitted = index;
    self.emitted.push_back(value);
    true
  }

  /// Counts one suspension. Returns the recorded resume value, or `None` after marking
  /// `payload` as the run's pending interrupt.
  pub(crate) fn request_resume(&mut self, payload: Value) -> Option<Value> {
    let index = self.next_suspension;
    self.next_suspension += 1;
    match self.resume_values.get(index) {
      Some(value) => {
        debug!(index, "replaying recorded resume value");
        Some(value.clone())
      }
      None => {
        debug!(index, "suspension has no resume value; pausing");
        self.pending = Some(payload);
        None
      }
    }
  }

  pub(crate) fn take_emitted(&mut self) -> Option<Value> {
    self.emitted.pop_front()
  }

  pub(crate) fn take_pending(&mut self) -> Option<Value> {
    self.pending.take()
  }

  /// The complete record to persist for this run.
  pub(crate) fn checkpoint(&self, input: &Value, pending: Option<Value>) -> CheckpointRecord {
    CheckpointRecord {
      input: input.clone(),
      resume_values: self.resume_values.clone(),
      last_emitted_index: self.last_emitted,
      pending_interrupt: pending,
    }
  }
}

/// Locks the cursor. The cursor holds plain data, so a poisoned lock is still usable.
pub(crate) fn lock(cursor: &Mutex<ReplayCursor>) -> MutexGuard<'_, ReplayCursor> {
  cursor.lock().unwrap_or_else(PoisonError::into_inner)
}
