// tests/integration/cli.rs

use clap::Parser;
use dagmake::cli::{CliArgs, Command};
use dagmake::resource::{JsonFile, Resource};
use dagmake::{build_context, format_task_list, Outputs, Pipeline, Task};
use serde_json::json;
use tempfile::TempDir;

/// `count` writes a number under `{root}`; `double` doubles it.
fn pipeline() -> Pipeline {
    let count = Resource::new("count", "{root}/count.json", JsonFile::new()).shared();
    let doubled = Resource::new("doubled", "{root}/{variant}/doubled.json", JsonFile::new()).shared();

    let mut pipeline = Pipeline::new();
    pipeline
        .add(
            Task::builder("count", |_inputs, ctx| {
                let start: i64 = ctx.parse("start")?;
                Ok(Outputs::single("count", json!(start)))
            })
            .output(&count),
        )
        .unwrap()
        .add(
            Task::builder("double", |inputs, _ctx| {
                let n: i64 = inputs.parse("count")?;
                Ok(Outputs::single("doubled", json!(n * 2)))
            })
            .input(&count)
            .output(&doubled),
        )
        .unwrap();
    pipeline
}

fn args(dir: &TempDir, rest: &[&str]) -> CliArgs {
    let root = format!("root={}", dir.path().display());
    let mut argv = vec!["pipeline", "--set", root.as_str(), "--set", "variant=main", "--set", "start=21"];
    argv.extend_from_slice(rest);
    CliArgs::try_parse_from(argv).unwrap()
}

fn read(path: std::path::PathBuf) -> serde_json::Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[test]
fn test_parses_subcommands_and_flags() {
    let parsed = CliArgs::try_parse_from(["p", "undo", "-t", "b", "--downstream"]).unwrap();
    assert!(matches!(
        parsed.command,
        Command::Undo { task: Some(ref t), downstream: true } if t == "b"
    ));

    let parsed = CliArgs::try_parse_from(["p", "run", "--task", "a", "-t", "b"]).unwrap();
    assert!(matches!(parsed.command, Command::Run { ref task } if task == &["a", "b"]));

    let parsed = CliArgs::try_parse_from(["p", "dot"]).unwrap();
    assert!(matches!(parsed.command, Command::Dot { ref output } if output == "pipeline.dot"));

    // Global flags are accepted after the subcommand too.
    let parsed = CliArgs::try_parse_from(["p", "ls", "--set", "k=v"]).unwrap();
    assert_eq!(parsed.set, vec![("k".to_string(), "v".to_string())]);

    assert!(CliArgs::try_parse_from(["p", "run", "--set", "not-a-pair"]).is_err());
    assert!(CliArgs::try_parse_from(["p"]).is_err());
}

#[test]
fn test_run_then_undo_on_real_files() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline();

    dagmake::run(args(&dir, &["run", "-t", "double"]), &pipeline).unwrap();
    assert_eq!(read(dir.path().join("count.json")), json!(21));
    assert_eq!(read(dir.path().join("main/doubled.json")), json!(42));

    dagmake::run(args(&dir, &["undo", "-t", "count"]), &pipeline).unwrap();
    assert!(!dir.path().join("count.json").exists());
    assert!(dir.path().join("main/doubled.json").exists());

    dagmake::run(args(&dir, &["run"]), &pipeline).unwrap();
    assert!(dir.path().join("count.json").exists());

    dagmake::run(args(&dir, &["undo", "-t", "count", "-d"]), &pipeline).unwrap();
    assert!(!dir.path().join("count.json").exists());
    assert!(!dir.path().join("main/doubled.json").exists());
}

#[test]
fn test_context_file_is_overridden_by_set_and_invocation() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("ctx.toml");
    std::fs::write(
        &config,
        "[context]\nvariant = \"from_file\"\nstart = 1\ncommand = \"ignored\"\n",
    )
    .unwrap();

    let config = config.to_string_lossy().into_owned();
    let parsed = CliArgs::try_parse_from([
        "p", "--config", config.as_str(), "--set", "start=5", "--set", "task=x", "undo", "-t", "count",
    ])
    .unwrap();
    let ctx = build_context(&parsed).unwrap();

    assert_eq!(ctx.get("variant"), Some("from_file"));
    assert_eq!(ctx.get("start"), Some("5"));
    assert_eq!(ctx.get("command"), Some("undo"));
    assert_eq!(ctx.get("task"), Some("count"));
    assert_eq!(ctx.get("downstream"), Some("false"));
}

#[test]
fn test_dot_writes_to_requested_path() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("graph.dot");
    let out_arg = out.to_string_lossy().into_owned();

    dagmake::run(args(&dir, &["dot", "-o", out_arg.as_str()]), &pipeline()).unwrap();

    let dot = std::fs::read_to_string(&out).unwrap();
    assert!(dot.contains("count"));
    assert!(dot.contains(" -> "));
}

#[test]
fn test_ls_lists_tasks_in_registration_order() {
    assert_eq!(
        format_task_list(&pipeline()),
        "Tasks in pipeline:\n\tcount\n\tdouble\n"
    );
}

#[test]
fn test_errors_surface_through_anyhow() {
    let dir = TempDir::new().unwrap();
    let err = dagmake::run(args(&dir, &["run", "-t", "missing"]), &pipeline()).unwrap_err();
    assert!(format!("{err}").contains("missing"));

    // Undoing outputs that were never produced is fine.
    dagmake::run(args(&dir, &["undo", "-t", "double"]), &pipeline()).unwrap();
}

#[test]
fn test_seed_context_sits_below_file_and_set() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("ctx.toml");
    std::fs::write(&config, "[context]\nvariant = \"from_file\"\n").unwrap();
    let config = config.to_string_lossy().into_owned();

    let parsed = CliArgs::try_parse_from([
        "p", "--config", config.as_str(), "--set", "start=5", "ls",
    ])
    .unwrap();
    let seed = dagmake::context::Context::new()
        .with("variant", "seeded")
        .with("start", 1)
        .with("root", "from_code");
    let ctx = dagmake::build_context_with(&parsed, seed).unwrap();

    assert_eq!(ctx.get("root"), Some("from_code"));
    assert_eq!(ctx.get("variant"), Some("from_file"));
    assert_eq!(ctx.get("start"), Some("5"));
    assert_eq!(ctx.get("command"), Some("ls"));
}

#[test]
fn test_run_with_seed_supplies_missing_values() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_string_lossy().into_owned();
    let parsed = CliArgs::try_parse_from(["p", "run", "-t", "count"]).unwrap();
    let seed = dagmake::context::Context::new()
        .with("root", root)
        .with("start", 7);

    dagmake::run_with(parsed, &pipeline(), seed).unwrap();
    assert_eq!(read(dir.path().join("count.json")), json!(7));
}
