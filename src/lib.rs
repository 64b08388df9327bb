// src/lib.rs

//! A make-style resource pipeline.
//!
//! Tasks declare the resources they consume and produce. Asking for a task
//! runs only what is missing upstream of it; undoing a task deletes its
//! outputs and, on request, those of everything downstream.

pub mod cli;
pub mod config;
pub mod context;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod export;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod resource;
pub mod types;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::context::Context;

pub use crate::dag::{Computation, Task, TaskBuilder};
pub use crate::errors::PipelineError;
pub use crate::pipeline::Pipeline;
pub use crate::resource::{Resource, Storage};
pub use crate::types::{Data, Inputs, Outputs};

/// Entry point for pipeline programs.
///
/// ```no_run
/// fn main() -> std::process::ExitCode {
///     let pipeline = dagmake::Pipeline::new();
///     dagmake::cli_main(&pipeline)
/// }
/// ```
pub fn cli_main(pipeline: &Pipeline) -> ExitCode {
    cli_main_with(pipeline, Context::new())
}

/// Like [`cli_main`], with context values supplied by the program itself.
///
/// `seed` sits below the context file, `--set` and the invocation
/// parameters.
pub fn cli_main_with(pipeline: &Pipeline, seed: Context) -> ExitCode {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("dagmake error: {err:?}");
        return ExitCode::FAILURE;
    }
    match run_with(args, pipeline, seed) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("dagmake error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

/// Dispatch a parsed command against `pipeline`.
///
/// This wires together:
/// - context file loading and `--set` overrides
/// - the invocation parameters (`command`, `task`, `downstream`)
/// - the engine, or the listing/export commands
pub fn run(args: CliArgs, pipeline: &Pipeline) -> Result<()> {
    run_with(args, pipeline, Context::new())
}

/// [`run`] on top of a program-supplied context.
pub fn run_with(args: CliArgs, pipeline: &Pipeline, seed: Context) -> Result<()> {
    let context = build_context_with(&args, seed)?;
    debug!(values = context.len(), command = args.command.name(), "context ready");

    match &args.command {
        Command::Run { task } => {
            let targets: Vec<&str> = task.iter().map(String::as_str).collect();
            let report = pipeline.run(&targets, &context)?;
            info!(
                executed = report.executed.len(),
                skipped = report.skipped.len(),
                "run complete"
            );
        }
        Command::Undo { task, downstream } => {
            let report = pipeline.undo(task.as_deref(), &context, *downstream)?;
            info!(
                tasks = report.undone.len(),
                deleted = report.deleted.len(),
                "undo complete"
            );
        }
        Command::Ls => {
            print!("{}", format_task_list(pipeline));
        }
        Command::Dot { output } => {
            let dot = pipeline.to_dot()?;
            if output == "-" {
                print!("{dot}");
            } else {
                std::fs::write(output, dot)
                    .with_context(|| format!("failed to write graph to {output}"))?;
                info!(path = %output, "graph written");
            }
        }
    }

    Ok(())
}

/// Listing printed by `ls`.
pub fn format_task_list(pipeline: &Pipeline) -> String {
    let mut out = String::from("Tasks in pipeline:\n");
    for name in pipeline.task_names() {
        out.push('\t');
        out.push_str(name);
        out.push('\n');
    }
    out
}

/// Context for one invocation, lowest precedence first: context file,
/// `--set` values, invocation parameters.
pub fn build_context(args: &CliArgs) -> Result<Context> {
    build_context_with(args, Context::new())
}

/// [`build_context`] with `seed` as the lowest layer.
pub fn build_context_with(args: &CliArgs, seed: Context) -> Result<Context> {
    let file = config::load_optional(args.config.as_deref().map(Path::new))?;

    let mut context = seed.merge(&file.to_context());
    for (key, value) in &args.set {
        context.insert(key.clone(), value);
    }

    context.insert("command", args.command.name());
    match &args.command {
        Command::Run { task } if !task.is_empty() => {
            context.insert("task", task.join(","));
        }
        Command::Undo { task, downstream } => {
            if let Some(task) = task {
                context.insert("task", task);
            }
            context.insert("downstream", downstream);
        }
        _ => {}
    }

    Ok(context)
}
