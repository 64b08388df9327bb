#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use dagmake::fs::mock::MockFileSystem;
use dagmake::resource::{JsonFile, JsonLinesFile, Resource};
use dagmake::{Data, Outputs, Task};
use serde_json::json;

/// A JSON document resource backed by `fs`.
pub fn json_resource(fs: &MockFileSystem, name: &str, location: &str) -> Arc<Resource> {
    Resource::new(name, location, JsonFile::with_fs(fs.clone())).shared()
}

/// A JSON-lines table resource backed by `fs`, pinned to `fields`.
pub fn table_resource(
    fs: &MockFileSystem,
    name: &str,
    location: &str,
    fields: &[&str],
) -> Arc<Resource> {
    Resource::new(name, location, JsonLinesFile::with_fs(fs.clone()))
        .with_fields(fields.iter().copied())
        .shared()
}

/// Records computation invocations, in call order.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct InvocationCounter {
    calls: Arc<Mutex<Vec<String>>>,
}

impl InvocationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, task: &str) {
        self.calls.lock().unwrap().push(task.to_string());
    }

    pub fn count(&self, task: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|t| *t == task).count()
    }

    pub fn total(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

/// A task that records its invocation and writes, for each output, a record
/// naming the task, the output and the inputs it was given.
pub fn recording_task(
    name: &str,
    inputs: &[&Arc<Resource>],
    outputs: &[&Arc<Resource>],
    counter: &InvocationCounter,
) -> Task {
    let task_name = name.to_string();
    let output_names: Vec<String> = outputs.iter().map(|r| r.name().to_string()).collect();
    let counter = counter.clone();

    let mut builder = Task::builder(name, move |inputs, _ctx| {
        counter.record(&task_name);
        let seen: Vec<&str> = inputs.names().collect();
        let mut out = Outputs::new();
        for output in output_names.iter() {
            out.insert(
                output.clone(),
                json!({ "task": task_name, "output": output, "inputs": seen }),
            );
        }
        Ok(out)
    });

    for input in inputs {
        builder = builder.input(input);
    }
    for output in outputs {
        builder = builder.output(output);
    }
    builder.build()
}

/// Decode a JSON file written to the mock filesystem.
pub fn read_json(fs: &MockFileSystem, location: &str) -> Option<Data> {
    fs.contents(location)
        .map(|bytes| serde_json::from_slice(&bytes).expect("mock file holds valid JSON"))
}
