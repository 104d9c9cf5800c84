//! Named tasks and their composition.
//!
//! A [Task] binds a name to an [Engine]. Routines compose tasks by driving a child's run
//! from inside their own body, either by hand (`child.stream(input, ctx.scope(child.name()))`)
//! or with [Task::forward], which surfaces every child suspension as a suspension of the
//! parent so the outermost caller resumes the whole tree through one run id.

use std::future::Future;

use futures::StreamExt;
use futures::stream::BoxStream;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::engine::{Engine, RunEvent, StepContext};
use crate::error::{RoutineError, TaskError};
use crate::types::{Command, ProgressEvent, RunInput, RunOptions};

/// A named step routine.
#[derive(Debug, Clone)]
pub struct Task {
  name: String,
  engine: Engine,
}

/// Creates a [Task] named `name` running `routine`.
pub fn task<F, Fut>(name: impl Into<String>, routine: F) -> Task
where
  F: Fn(Value, StepContext) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<Value, RoutineError>> + Send + 'static,
{
  Task::new(name, routine)
}

impl Task {
  pub fn new<F, Fut>(name: impl Into<String>, routine: F) -> Self
  where
    F: Fn(Value, StepContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, RoutineError>> + Send + 'static,
  {
    let name = name.into();
    Self {
      engine: Engine::named(name.clone(), routine),
      name,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn engine(&self) -> &Engine {
    &self.engine
  }

  /// See [Engine::stream].
  pub fn stream(
    &self,
    input: impl Into<RunInput>,
    options: RunOptions,
  ) -> BoxStream<'static, Result<ProgressEvent, TaskError>> {
    self.engine.stream(input, options)
  }

  /// See [Engine::invoke].
  pub async fn invoke(
    &self,
    input: impl Into<RunInput>,
    options: RunOptions,
  ) -> Result<Value, TaskError> {
    self.engine.invoke(input, options).await
  }

  /// Continues the paused run in `options` with `value` and drives it to completion.
  pub async fn resume(
    &self,
    value: impl Into<Value>,
    options: RunOptions,
  ) -> Result<Value, TaskError> {
    self.engine.invoke(Command::resume(value), options).await
  }

  /// Continues the paused run in `options` with `value`, streaming its progress.
  pub fn resume_stream(
    &self,
    value: impl Into<Value>,
    options: RunOptions,
  ) -> BoxStream<'static, Result<ProgressEvent, TaskError>> {
    self.engine.stream(Command::resume(value), options)
  }

  /// Runs this task as a child of the routine owning `ctx` and returns its final value.
  ///
  /// The child runs under `ctx.scope(self.name())`. Each child progress value is emitted as
  /// a progress point of the parent; each child interrupt is passed to the parent's
  /// `suspend`, and the value the parent receives resumes the child. When the parent is
  /// replayed, the child is replayed from its input again, which rebuilds its checkpoint
  /// under the scoped id.
  ///
  /// A failing child routine's error is returned as-is; engine failures come back boxed
  /// as a [TaskError].
  #[instrument(level = "trace", skip(self, ctx, input), fields(task = %self.name))]
  pub async fn forward(
    &self,
    ctx: &StepContext,
    input: impl Into<RunInput>,
  ) -> Result<Value, RoutineError> {
    let options = ctx.scope(&self.name);
    let mut input = input.into();
    loop {
      let mut events = self.engine.run(input, options.clone());
      let mut interrupt = None;
      while let Some(event) = events.next().await {
        match event.map_err(TaskError::into_boxed_routine_error)? {
          RunEvent::Progress(ev) => {
            if let Some(value) = ev.value {
              ctx.emit(value).await;
            }
          }
          RunEvent::Interrupted(ev) => interrupt = ev.interrupt,
          RunEvent::Finished(value) => return Ok(value),
        }
      }
      debug!(task = %self.name, "forwarding child interrupt to parent");
      let resume = ctx.suspend(interrupt.unwrap_or_default()).await;
      input = Command::resume(resume).into();
    }
  }
}
