// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! There is no standalone binary: a program builds its
//! [`Pipeline`](crate::pipeline::Pipeline) and hands it to
//! [`cli_main`](crate::cli_main), which parses these arguments.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for a pipeline program.
#[derive(Debug, Clone, Parser)]
#[command(
    version,
    about = "Run and undo tasks of a resource pipeline.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the context file (TOML).
    ///
    /// Default: `Dagmake.toml` in the current working directory, when present.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DAGMAKE_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Set a context value, overriding the context file.
    #[arg(
        long = "set",
        global = true,
        value_name = "KEY=VALUE",
        value_parser = parse_key_val
    )]
    pub set: Vec<(String, String)>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Produce missing resources for the given tasks (all tasks if none given).
    Run {
        #[arg(short, long, value_name = "NAME")]
        task: Vec<String>,
    },
    /// Delete the outputs of a task (all tasks if none given).
    Undo {
        #[arg(short, long, value_name = "NAME")]
        task: Option<String>,

        /// Also undo every task consuming the target's outputs, transitively.
        #[arg(short, long)]
        downstream: bool,
    },
    /// List registered tasks.
    Ls,
    /// Write the dependency graph in Graphviz format (`-` for stdout).
    Dot {
        #[arg(short, long, value_name = "PATH", default_value = "pipeline.dot")]
        output: String,
    },
}

impl Command {
    /// Name used for the `command` context value.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Run { .. } => "run",
            Command::Undo { .. } => "undo",
            Command::Ls => "ls",
            Command::Dot { .. } => "dot",
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let key = key.trim();
    if !crate::context::is_identifier(key) {
        return Err(format!("'{key}' is not a valid context key"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
