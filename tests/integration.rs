//! End-to-end behavior of the public API: progress, suspension, resumption, replay and
//! isolation, across both checkpoint stores.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::TryStreamExt;
use serde_json::{Value, json};
use streamweave_resumable::{
  CheckpointStore, Command, FileCheckpointStore, InMemoryCheckpointStore, ProgressEvent,
  RunOptions, Task, TaskError, task,
};

fn two_step() -> Task {
  task("two_step", |input, ctx| async move {
    ctx.emit(json!({"started": input})).await;
    let a = ctx.suspend(json!({"need": "first"})).await;
    ctx.emit(json!({"got": a})).await;
    let b = ctx.suspend(json!({"need": "second"})).await;
    Ok(json!({"a": a, "b": b}))
  })
}

async fn events(
  t: &Task,
  input: impl Into<streamweave_resumable::RunInput>,
  options: RunOptions,
) -> Vec<ProgressEvent> {
  t.stream(input, options).try_collect().await.unwrap()
}

#[tokio::test]
async fn plain_routine_streams_and_invokes() {
  let t = task("plain", |input, ctx| async move {
    let n = input.as_i64().unwrap_or_default();
    ctx.emit(n).await;
    ctx.emit(n + 1).await;
    Ok(json!(n * 100))
  });
  let evs = events(&t, json!(4), RunOptions::ephemeral()).await;
  let vals: Vec<Value> = evs.into_iter().filter_map(|e| e.value).collect();
  assert_eq!(vals, vec![json!(4), json!(5)]);
  assert_eq!(t.invoke(json!(4), RunOptions::ephemeral()).await.unwrap(), json!(400));
}

#[tokio::test]
async fn round_trip_through_file_store_across_instances() {
  let dir = tempfile::tempdir().unwrap();
  let t = two_step();
  let options = || RunOptions::new("job-7", Arc::new(FileCheckpointStore::new(dir.path())));

  let first = events(&t, json!("x"), options()).await;
  assert_eq!(first.len(), 2);
  assert_eq!(first[1].interrupt, Some(json!({"need": "first"})));

  let second = events(&t, Command::resume("A"), options()).await;
  assert_eq!(second[0].value, Some(json!({"got": "A"})));
  assert_eq!(second[1].interrupt, Some(json!({"need": "second"})));

  let out = t.resume("B", options()).await.unwrap();
  assert_eq!(out, json!({"a": "A", "b": "B"}));
}

#[tokio::test]
async fn clearing_a_run_forgets_it() {
  let store = Arc::new(InMemoryCheckpointStore::new());
  let options = RunOptions::new("r", store.clone());
  let t = two_step();
  events(&t, json!(1), options.clone()).await;
  store.clear("r").await.unwrap();
  let err = t.resume("A", options).await.unwrap_err();
  assert!(matches!(err, TaskError::UnresolvedResumeTarget { .. }));
}

#[tokio::test]
async fn interrupted_invoke_without_store_runs_cleanup() {
  struct Guard(Arc<AtomicBool>);
  impl Drop for Guard {
    fn drop(&mut self) {
      self.0.store(true, Ordering::SeqCst);
    }
  }
  let cleaned = Arc::new(AtomicBool::new(false));
  let t = {
    let cleaned = cleaned.clone();
    task("guarded", move |_input, ctx| {
      let guard = Guard(cleaned.clone());
      async move {
        let _guard = guard;
        Ok(ctx.suspend("who?").await)
      }
    })
  };
  let err = t.invoke(json!(null), RunOptions::ephemeral()).await.unwrap_err();
  assert!(err.is_interrupted());
  assert!(err.to_string().contains("interrupted without output"));
  assert!(cleaned.load(Ordering::SeqCst));
}

#[tokio::test]
async fn identical_prior_state_replays_identically() {
  let store = Arc::new(InMemoryCheckpointStore::new());
  let t = two_step();
  let options = RunOptions::new("r", store.clone());
  events(&t, json!("x"), options.clone()).await;
  let snapshot = store.load("r").await.unwrap().unwrap();

  let other = Arc::new(InMemoryCheckpointStore::new());
  other.save("r", snapshot).await.unwrap();
  let a = events(&t, Command::resume("A"), options).await;
  let b = events(&t, Command::resume("A"), RunOptions::new("r", other)).await;
  assert_eq!(a, b);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 3)]
async fn three_concurrent_ephemeral_runs() {
  let t = task("plus_two", |input, ctx| async move {
    let n = input.as_i64().unwrap_or_default();
    ctx.emit(n).await;
    Ok(json!(n + 2))
  });
  let (a, b, c) = tokio::join!(
    t.invoke(json!(1), RunOptions::ephemeral()),
    t.invoke(json!(2), RunOptions::ephemeral()),
    t.invoke(json!(3), RunOptions::ephemeral()),
  );
  assert_eq!(
    vec![a.unwrap(), b.unwrap(), c.unwrap()],
    vec![json!(3), json!(4), json!(5)]
  );
}
