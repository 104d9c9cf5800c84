//! Execution core: drives one step routine through its progress points and suspensions.
//!
//! A run re-executes the routine from the start on every call. Two cursors fast-forward
//! through recorded history: progress points at or below the checkpoint's
//! `last_emitted_index` are replayed silently, and suspensions with a recorded resume value
//! return it immediately. The first unrecorded suspension pauses the run: the next
//! checkpoint is saved, the routine future is dropped (its cleanup runs) and the stream
//! ends on an interrupt event.

mod context;
mod driver;
mod replay;

pub use context::{Emit, StepContext, Suspend};
pub use driver::{Engine, RoutineFuture};
pub(crate) use driver::RunEvent;
