//! CLI: run the built-in `publish` workflow with file-backed checkpoints.
//!
//! `publish` drafts a document, hands it to the nested `review` task (which asks for a
//! verdict) and then asks for a publish channel. Each question pauses the run; the run can
//! be resumed later, from another process, with `--resume`.
//!
//! Usage: `run_task [OPTIONS] [INPUT_JSON]`
//! Example:
//!   run_task --run-id post-1 '"release notes"'
//!   run_task --run-id post-1 --resume '"approved"'
//!   run_task --run-id post-1 --resume '"blog"' --invoke
//!
//! Set RUST_LOG=streamweave_resumable=trace for TRACE-level span enter/exit and events.

use std::env;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use futures::StreamExt;
use serde_json::{Value, json};
use streamweave_resumable::{
  Command, FileCheckpointStore, RoutineError, RunInput, RunOptions, Task, TaskError, task,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

const STORE_DIR: &str = ".resumable";

/// Run (or resume) the built-in publish workflow.
#[derive(Parser, Debug)]
#[command(name = "run_task")]
#[command(after_help = r#"Environment variables (override --store-dir when set):
  RESUMABLE_STORE_DIR   Directory holding one checkpoint file per run (default: .resumable).

Examples:
  run_task --run-id post-1 '"release notes"'
  run_task --run-id post-1 --resume '"approved"'"#)]
struct Args {
  /// Directory for checkpoint files. Overridden by RESUMABLE_STORE_DIR if set.
  #[arg(long, value_name = "DIR", default_value = STORE_DIR)]
  store_dir: PathBuf,

  /// Run id. Generated for fresh runs when omitted; required with --resume.
  #[arg(long, value_name = "ID")]
  run_id: Option<String>,

  /// Resume the paused run with this JSON value instead of starting a new one.
  #[arg(long, value_name = "JSON", conflicts_with = "input")]
  resume: Option<String>,

  /// Drive the run to completion and print only its final value.
  #[arg(long)]
  invoke: bool,

  /// Input for a fresh run (JSON).
  #[arg(value_name = "INPUT_JSON", default_value = "null")]
  input: String,
}

fn review() -> Task {
  task("review", |input, ctx| async move {
    ctx.emit(json!({"reviewing": input})).await;
    let verdict = ctx.suspend(json!({"question": "approve the draft?"})).await;
    Ok::<Value, RoutineError>(json!({"verdict": verdict}))
  })
}

fn publish() -> Task {
  let review = review();
  task("publish", move |input, ctx| {
    let review = review.clone();
    async move {
      ctx.emit(json!({"drafted": input})).await;
      let outcome = review.forward(&ctx, input.clone()).await?;
      let channel = ctx.suspend(json!({"question": "publish where?"})).await;
      ctx.emit(json!({"published_to": channel})).await;
      Ok::<Value, RoutineError>(json!({"doc": input, "review": outcome, "channel": channel}))
    }
  })
}

fn parse_json(what: &str, text: &str) -> Value {
  match serde_json::from_str(text) {
    Ok(v) => v,
    Err(e) => {
      eprintln!("Error parsing {} as JSON: {}", what, e);
      process::exit(1);
    }
  }
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let store_dir = env::var("RESUMABLE_STORE_DIR")
    .ok()
    .map(PathBuf::from)
    .unwrap_or_else(|| args.store_dir.clone());

  let (input, run_id): (RunInput, String) = match (&args.resume, &args.run_id) {
    (Some(value), Some(id)) => (
      Command::resume(parse_json("--resume", value)).into(),
      id.clone(),
    ),
    (Some(_), None) => {
      eprintln!("--resume requires --run-id");
      process::exit(1);
    }
    (None, id) => (
      parse_json("INPUT_JSON", &args.input).into(),
      id.clone().unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
    ),
  };

  info!(
    run_id = %run_id,
    store_dir = %store_dir.display(),
    resuming = input.is_resume(),
    "run_task starting"
  );
  let store = Arc::new(FileCheckpointStore::new(&store_dir));
  let options = RunOptions::new(run_id.clone(), store);
  let workflow = publish();

  if args.invoke {
    match workflow.invoke(input, options).await {
      Ok(value) => println!("{}", value),
      Err(TaskError::InterruptedWithoutOutput { payload }) => {
        println!("Run {} paused: {}", run_id, payload);
      }
      Err(e) => {
        eprintln!("Run error: {}", e);
        process::exit(1);
      }
    }
    return;
  }

  let mut events = workflow.stream(input, options);
  while let Some(event) = events.next().await {
    match event {
      Ok(ev) => {
        let line =
          serde_json::to_string(&ev).unwrap_or_else(|e| format!("<unprintable event: {e}>"));
        println!("{}", line);
        if let Some(payload) = ev.interrupt {
          eprintln!(
            "Run {} paused on {}. Resume with: run_task --run-id {} --resume '<json>'",
            run_id, payload, run_id
          );
        }
      }
      Err(e) => {
        eprintln!("Run error: {}", e);
        process::exit(1);
      }
    }
  }
}
