//! The handle a step routine uses to emit progress and suspend.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use serde_json::Value;

use super::replay::{ReplayCursor, lock};
use crate::types::RunOptions;

/// Passed to every step routine invocation.
///
/// Cloning is cheap; all clones address the same run.
#[derive(Clone)]
pub struct StepContext {
  cursor: Arc<Mutex<ReplayCursor>>,
  options: RunOptions,
}

impl StepContext {
  pub(crate) fn new(cursor: Arc<Mutex<ReplayCursor>>, options: RunOptions) -> Self {
    Self { cursor, options }
  }

  /// Requests a value from the caller.
  ///
  /// Resolves at once when the run's checkpoint already holds a resume value for this
  /// suspension. Otherwise `payload` becomes the run's pending interrupt and the future
  /// never resolves; the driver drops the routine instead.
  pub fn suspend(&self, payload: impl Into<Value>) -> Suspend {
    Suspend {
      cursor: Arc::clone(&self.cursor),
      payload: Some(payload.into()),
      parked: false,
    }
  }

  /// Reports one progress point. Points already handed out by an earlier call of the same
  /// run are skipped silently.
  pub fn emit(&self, value: impl Into<Value>) -> Emit {
    Emit {
      cursor: Arc::clone(&self.cursor),
      value: Some(value.into()),
      queued: false,
    }
  }

  pub fn run_id(&self) -> Option<&str> {
    self.options.run_id.as_deref()
  }

  pub fn is_ephemeral(&self) -> bool {
    self.options.is_ephemeral()
  }

  /// Run options for a child task `name` driven from this routine.
  pub fn scope(&self, name: &str) -> RunOptions {
    self.options.scoped(name)
  }
}

impl std::fmt::Debug for StepContext {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepContext")
      .field("options", &self.options)
      .finish_non_exhaustive()
  }
}

/// Future returned by [StepContext::suspend].
#[must_use = "suspend does nothing unless awaited"]
#[derive(Debug)]
pub struct Suspend {
  cursor: Arc<Mutex<ReplayCursor>>,
  payload: Option<Value>,
  parked: bool,
}

impl Future for Suspend {
  type Output = Value;

  fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Value> {
    let this = self.get_mut();
    if this.parked {
      return Poll::Pending;
    }
    let Some(payload) = this.payload.take() else {
      return Poll::Pending;
    };
    match lock(&this.cursor).request_resume(payload) {
      Some(value) => Poll::Ready(value),
      None => {
        this.parked = true;
        Poll::Pending
      }
    }
  }
}

/// Future returned by [StepContext::emit].
#[must_use = "emit does nothing unless awaited"]
#[derive(Debug)]
pub struct Emit {
  cursor: Arc<Mutex<ReplayCursor>>,
  value: Option<Value>,
  queued: bool,
}

impl Future for Emit {
  type Output = ();

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
    let this = self.get_mut();
    if this.queued {
      return Poll::Ready(());
    }
    let Some(value) = this.value.take() else {
      return Poll::Ready(());
    };
    if lock(&this.cursor).record_progress(value) {
      // Yield once so the driver can hand the value out before the routine continues.
      // Combinators only re-poll woken children, so ask to be polled again.
      this.queued = true;
      cx.waker().wake_by_ref();
      Poll::Pending
    } else {
      Poll::Ready(())
    }
  }
}
