//! Values that flow between callers, the engine and checkpoint stores.

mod checkpoint;
#[cfg(test)]
mod checkpoint_test;
mod command;
mod progress_event;
#[cfg(test)]
mod progress_event_test;
mod run_options;

pub use checkpoint::{CheckpointRecord, NOTHING_EMITTED};
pub use command::{Command, RunInput};
pub use progress_event::ProgressEvent;
pub use run_options::RunOptions;
