//! [Engine]: runs a step routine as a resumable stream of progress events.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use async_stream::try_stream;
use futures::future::{BoxFuture, poll_fn};
use futures::stream::BoxStream;
use futures::{FutureExt, StreamExt, TryStreamExt};
use serde_json::Value;
use tracing::{info, instrument};

use super::StepContext;
use super::replay::{ReplayCursor, lock};
use crate::error::{RoutineError, TaskError};
use crate::types::{CheckpointRecord, ProgressEvent, RunInput, RunOptions};

/// Boxed future of one step routine invocation.
pub type RoutineFuture = BoxFuture<'static, Result<Value, RoutineError>>;

type Routine = dyn Fn(Value, StepContext) -> RoutineFuture + Send + Sync;

/// Everything a run yields, including the final value that `stream` does not expose.
#[derive(Debug)]
pub(crate) enum RunEvent {
  Progress(ProgressEvent),
  Interrupted(ProgressEvent),
  Finished(Value),
}

/// What one poll of the routine produced.
enum Step {
  Progress(Value),
  Suspended(Value),
  Finished(Result<Value, RoutineError>),
}

/// Drives one step routine. Holds no per-run state, so one engine can serve any number of
/// concurrent runs.
#[derive(Clone)]
pub struct Engine {
  name: Option<String>,
  routine: Arc<Routine>,
}

impl Engine {
  pub fn new<F, Fut>(routine: F) -> Self
  where
    F: Fn(Value, StepContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, RoutineError>> + Send + 'static,
  {
    Self {
      name: None,
      routine: Arc::new(move |input: Value, ctx: StepContext| -> RoutineFuture {
        routine(input, ctx).boxed()
      }),
    }
  }

  /// Engine whose events carry `name` in their task slot.
  pub fn named<F, Fut>(name: impl Into<String>, routine: F) -> Self
  where
    F: Fn(Value, StepContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, RoutineError>> + Send + 'static,
  {
    Self {
      name: Some(name.into()),
      ..Self::new(routine)
    }
  }

  pub fn name(&self) -> Option<&str> {
    self.name.as_deref()
  }

  /// Lazily runs the routine, yielding its new progress points and, when it pauses, a
  /// terminal interrupt event. The final value is not part of the stream.
  pub fn stream(
    &self,
    input: impl Into<RunInput>,
    options: RunOptions,
  ) -> BoxStream<'static, Result<ProgressEvent, TaskError>> {
    self
      .run(input.into(), options)
      .try_filter_map(|event| async move {
        Ok(match event {
          RunEvent::Progress(ev) | RunEvent::Interrupted(ev) => Some(ev),
          RunEvent::Finished(_) => None,
        })
      })
      .boxed()
  }

  /// Runs the routine to completion and returns its final value.
  ///
  /// Fails with [TaskError::InterruptedWithoutOutput] when the run pauses; the routine has
  /// been dropped (and its cleanup has run) by the time the error is returned.
  #[instrument(level = "trace", skip(self, input, options), fields(task = ?self.name))]
  pub async fn invoke(
    &self,
    input: impl Into<RunInput>,
    options: RunOptions,
  ) -> Result<Value, TaskError> {
    let mut events = self.run(input.into(), options);
    let mut interrupt = None;
    while let Some(event) = events.next().await {
      match event? {
        RunEvent::Progress(_) => {}
        RunEvent::Interrupted(ev) => interrupt = ev.interrupt,
        RunEvent::Finished(value) => return Ok(value),
      }
    }
    Err(TaskError::InterruptedWithoutOutput {
      payload: interrupt.unwrap_or_default(),
    })
  }

  pub(crate) fn run(
    &self,
    input: RunInput,
    options: RunOptions,
  ) -> BoxStream<'static, Result<RunEvent, TaskError>> {
    let routine = Arc::clone(&self.routine);
    let task = self.name.clone();
    Box::pin(try_stream! {
      let resuming = input.is_resume();
      let record = prepare(input, &options).await?;
      info!(
        task = ?task,
        run_id = ?options.run_id,
        resuming,
        replay_resumes = record.resume_values.len(),
        last_emitted = record.last_emitted_index,
        "run starting"
      );
      let cursor = Arc::new(Mutex::new(ReplayCursor::from_record(&record)));
      let ctx = StepContext::new(Arc::clone(&cursor), options.clone());
      let mut routine_fut = routine(record.input.clone(), ctx);

      loop {
        let step = poll_fn(|cx| poll_step(routine_fut.as_mut(), &cursor, cx)).await;
        match step {
          Step::Progress(value) => {
            yield RunEvent::Progress(ProgressEvent::progress(value, task.clone()));
          }
          Step::Suspended(payload) => {
            // Forced finalization: the routine never sees its resume value in this call.
            drop(routine_fut);
            let next = lock(&cursor).checkpoint(&record.input, Some(payload.clone()));
            persist(&options, next).await?;
            info!(task = ?task, run_id = ?options.run_id, "run suspended");
            yield RunEvent::Interrupted(ProgressEvent::interrupted(payload, task.clone()));
            break;
          }
          Step::Finished(result) => {
            // Points queued during the final poll are already counted as emitted.
            loop {
              let queued = lock(&cursor).take_emitted();
              let Some(value) = queued else { break };
              yield RunEvent::Progress(ProgressEvent::progress(value, task.clone()));
            }
            let value = result.map_err(TaskError::Routine)?;
            let next = lock(&cursor).checkpoint(&record.input, None);
            persist(&options, next).await?;
            info!(task = ?task, run_id = ?options.run_id, "run complete");
            yield RunEvent::Finished(value);
            break;
          }
        }
      }
    })
  }
}

impl std::fmt::Debug for Engine {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Engine")
      .field("name", &self.name)
      .finish_non_exhaustive()
  }
}

/// Builds the record a run starts from: a fresh one, or the stored one extended by the
/// command's resume value.
async fn prepare(input: RunInput, options: &RunOptions) -> Result<CheckpointRecord, TaskError> {
  let cmd = match input {
    RunInput::Fresh(value) => return Ok(CheckpointRecord::fresh(value)),
    RunInput::Resume(cmd) => cmd,
  };
  let unresolved = |reason| TaskError::UnresolvedResumeTarget {
    run_id: options.run_id.clone(),
    reason,
  };
  let Some((run_id, store)) = options.persistence() else {
    return Err(unresolved("no checkpoint store configured"));
  };
  let Some(mut record) = store.load(run_id).await? else {
    return Err(unresolved("no checkpoint recorded"));
  };
  if record.pending_interrupt.take().is_none() {
    return Err(unresolved("no pending suspension"));
  }
  record.resume_values.push(cmd.resume);
  Ok(record)
}

async fn persist(options: &RunOptions, record: CheckpointRecord) -> Result<(), TaskError> {
  if let Some((run_id, store)) = options.persistence() {
    store.save(run_id, record).await?;
  }
  Ok(())
}

/// Polls the routine once, handing out queued progress before running it further.
fn poll_step<F>(
  routine: Pin<&mut F>,
  cursor: &Mutex<ReplayCursor>,
  cx: &mut Context<'_>,
) -> Poll<Step>
where
  F: Future<Output = Result<Value, RoutineError>> + ?Sized,
{
  let queued = lock(cursor).take_emitted();
  if let Some(value) = queued {
    return Poll::Ready(Step::Progress(value));
  }
  if let Poll::Ready(result) = routine.poll(cx) {
    return Poll::Ready(Step::Finished(result));
  }
  let mut c = lock(cursor);
  if let Some(value) = c.take_emitted() {
    Poll::Ready(Step::Progress(value))
  } else if let Some(payload) = c.take_pending() {
    Poll::Ready(Step::Suspended(payload))
  } else {
    Poll::Pending
  }
}
