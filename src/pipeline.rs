// src/pipeline.rs

//! The task registry.
//!
//! Tasks are appended at definition time; the dependency graph is built from
//! them the first time it is needed and reused until another task is
//! registered.

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::debug;

use crate::context::Context;
use crate::dag::{DagGraph, Task, TaskBuilder};
use crate::engine::{self, EngineObserver, RunReport, TracingObserver, UndoReport};
use crate::errors::{PipelineError, Result};
use crate::export;

#[derive(Debug, Default)]
pub struct Pipeline {
    /// Registration order.
    tasks: Vec<Task>,
    index: HashMap<String, usize>,
    graph: OnceLock<DagGraph>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task. Names must be unique.
    pub fn register(&mut self, task: Task) -> Result<&mut Self> {
        if self.index.contains_key(task.name()) {
            return Err(PipelineError::DuplicateTask(task.name().to_string()));
        }

        debug!(
            task = %task.name(),
            inputs = task.inputs().len(),
            outputs = task.outputs().len(),
            "registering task"
        );

        self.index.insert(task.name().to_string(), self.tasks.len());
        self.tasks.push(task);
        // The next resolution rebuilds the graph.
        self.graph = OnceLock::new();
        Ok(self)
    }

    /// Build and register in one step.
    pub fn add(&mut self, builder: TaskBuilder) -> Result<&mut Self> {
        self.register(builder.build())
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.index.get(name).map(|&i| &self.tasks[i])
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|t| t.name())
    }

    /// The dependency graph, built on first use.
    pub fn graph(&self) -> Result<&DagGraph> {
        if let Some(graph) = self.graph.get() {
            return Ok(graph);
        }
        let built = DagGraph::build(&self.tasks)?;
        Ok(self.graph.get_or_init(|| built))
    }

    /// Run `targets` (all tasks if empty), logging through `tracing`.
    pub fn run(&self, targets: &[&str], context: &Context) -> Result<RunReport> {
        self.run_with(targets, context, &TracingObserver)
    }

    pub fn run_with(
        &self,
        targets: &[&str],
        context: &Context,
        observer: &dyn EngineObserver,
    ) -> Result<RunReport> {
        engine::run(self, targets, context, observer)
    }

    /// Undo `target` (all tasks if `None`), logging through `tracing`.
    pub fn undo(
        &self,
        target: Option<&str>,
        context: &Context,
        downstream: bool,
    ) -> Result<UndoReport> {
        self.undo_with(target, context, downstream, &TracingObserver)
    }

    pub fn undo_with(
        &self,
        target: Option<&str>,
        context: &Context,
        downstream: bool,
        observer: &dyn EngineObserver,
    ) -> Result<UndoReport> {
        engine::undo(self, target, context, downstream, observer)
    }

    /// Graphviz description of the dependency graph.
    pub fn to_dot(&self) -> Result<String> {
        export::to_dot(self)
    }
}
