//! A three-step pipeline over local files.
//!
//! ```text
//! cargo run --example squares -- run
//! cargo run --example squares -- --set data_dir=out --set count=5 run
//! cargo run --example squares -- undo -t make_numbers -d
//! cargo run --example squares -- dot -o -
//! ```

use std::process::ExitCode;

use anyhow::Result;
use dagmake::context::Context;
use dagmake::resource::{CborFile, JsonFile, JsonLinesFile, Resource};
use dagmake::{task, Inputs, Outputs, Pipeline};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct Number {
    n: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Square {
    n: i64,
    square: i64,
}

fn make_numbers(_inputs: &Inputs, ctx: &Context) -> Result<Outputs> {
    let count: i64 = match ctx.get("count") {
        Some(_) => ctx.parse("count")?,
        None => 10,
    };
    let numbers: Vec<Number> = (1..=count).map(|n| Number { n }).collect();
    Outputs::new().with_serialized("numbers", &numbers)
}

fn square_numbers(inputs: &Inputs, _ctx: &Context) -> Result<Outputs> {
    let numbers: Vec<Number> = inputs.parse("numbers")?;
    let squares: Vec<Square> = numbers
        .into_iter()
        .map(|Number { n }| Square { n, square: n * n })
        .collect();
    Outputs::new().with_serialized("squares", &squares)
}

fn summarise(inputs: &Inputs, _ctx: &Context) -> Result<Outputs> {
    let squares: Vec<Square> = inputs.parse("squares")?;
    let total: i64 = squares.iter().map(|s| s.square).sum();
    Outputs::new()
        .with("summary", serde_json::json!({ "rows": squares.len(), "total": total }))
        .with_serialized("snapshot", &squares)
}

fn build() -> Result<Pipeline> {
    let numbers = Resource::new("numbers", "{data_dir}/numbers.jsonl", JsonLinesFile::new())
        .with_fields(["n"])
        .shared();
    let squares = Resource::new("squares", "{data_dir}/squares.jsonl", JsonLinesFile::new())
        .with_fields(["n", "square"])
        .shared();
    let summary = Resource::new("summary", "{data_dir}/summary.json", JsonFile::new())
        .with_fields(["rows", "total"])
        .with_assertion("total_non_negative", |data| {
            match data["total"].as_i64() {
                Some(t) if t >= 0 => Ok(()),
                _ => Err(format!("unexpected total {}", data["total"])),
            }
        })
        .shared();
    let snapshot = Resource::new("snapshot", "{data_dir}/squares.cbor", CborFile::new()).shared();

    let mut pipeline = Pipeline::new();
    pipeline
        .add(task!(make_numbers).output(&numbers))?
        .add(task!(square_numbers).input(&numbers).output(&squares))?
        .add(
            task!(summarise)
                .input(&squares)
                .output(&summary)
                .output(&snapshot),
        )?;
    Ok(pipeline)
}

fn main() -> ExitCode {
    match build() {
        Ok(pipeline) => {
            let defaults = Context::new().with("data_dir", "data");
            dagmake::cli_main_with(&pipeline, defaults)
        }
        Err(err) => {
            eprintln!("dagmake error: {err:?}");
            ExitCode::FAILURE
        }
    }
}
