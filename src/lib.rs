//! # streamweave-resumable
//!
//! Resumable step routines driven as async streams.
//!
//! A step routine is an async function `(input, StepContext) -> Result<Value, _>` that reports
//! progress with [StepContext::emit] and asks its caller for values with
//! [StepContext::suspend]. The [Engine] runs it as a stream of [ProgressEvent]s. When the
//! routine reaches a suspension that has no value yet, the engine saves a
//! [CheckpointRecord] under the run id, drops the routine and ends the stream on an
//! interrupt event. Calling again with a [Command] re-executes the routine from its original
//! input, replays everything already recorded without re-emitting it, and continues.
//!
//! ## Architecture
//!
//! - [store]: [CheckpointStore] trait and the in-memory store.
//! - [checkpoint_io]: JSON files per run, for resuming from another process.
//! - [engine]: replay cursors, [StepContext] and the [Engine] driver.
//! - [task]: named tasks and nested composition ([Task::forward]).
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use streamweave_resumable::{Command, InMemoryCheckpointStore, RunOptions, task};
//!
//! # tokio_test::block_on(async {
//! let approve = task("approve", |input, ctx| async move {
//!   ctx.emit(json!({"drafted": input})).await;
//!   let answer = ctx.suspend("ship it?").await;
//!   Ok(json!({"approved": answer}))
//! });
//!
//! let options = RunOptions::new("run-1", Arc::new(InMemoryCheckpointStore::new()));
//! let err = approve.invoke(json!("doc"), options.clone()).await.unwrap_err();
//! assert!(err.is_interrupted());
//!
//! let out = approve.invoke(Command::resume("yes"), options).await.unwrap();
//! assert_eq!(out, json!({"approved": "yes"}));
//! # });
//! ```

pub mod checkpoint_io;
#[cfg(test)]
mod checkpoint_io_test;
pub mod engine;
pub mod error;
pub mod store;
pub mod task;
pub mod types;

pub use checkpoint_io::FileCheckpointStore;
pub use engine::{Engine, StepContext};
pub use error::{RoutineError, StoreError, TaskError};
pub use store::{CheckpointStore, InMemoryCheckpointStore};
pub use task::{Task, task};
pub use types::{CheckpointRecord, Command, ProgressEvent, RunInput, RunOptions};
