// src/engine/mod.rs

//! Resolution, execution and undo.
//!
//! - [`resolve`] walks the graph upstream from the requested targets and runs
//!   whatever is missing, skipping tasks whose outputs all exist.
//! - [`undo`] deletes task outputs, optionally cascading to every downstream
//!   consumer first.
//! - [`observer`] carries what the engine decides to the outside world; the
//!   engine itself never logs.
//!
//! All state here is per invocation: nothing survives a call to `run` or
//! `undo` except the resources themselves.

use crate::types::{ResourceName, TaskName};

pub mod observer;
pub mod resolve;
pub mod undo;

pub use observer::{EngineObserver, NoopObserver, TracingObserver};
pub use resolve::run;
pub use undo::undo;

/// Per-invocation state of a task during the upstream walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// The walk entered this task and is resolving its inputs.
    Visiting,
    /// The task was executed or found up to date in this invocation.
    Done,
}

/// Everything the engine reports while it works.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    RunStarted {
        targets: Vec<TaskName>,
    },
    /// An input is absent; its producer is resolved before the consumer.
    InputMissing {
        task: TaskName,
        resource: ResourceName,
        location: String,
        producer: TaskName,
    },
    /// All declared outputs exist; the task is not executed.
    TaskSkipped {
        task: TaskName,
    },
    TaskStarted {
        task: TaskName,
    },
    ResourceLoaded {
        task: TaskName,
        resource: ResourceName,
        location: String,
    },
    ResourceSaved {
        task: TaskName,
        resource: ResourceName,
        location: String,
    },
    TaskFinished {
        task: TaskName,
    },
    RunFinished {
        executed: usize,
        skipped: usize,
    },
    UndoStarted {
        /// Tasks to undo, in the order they will be undone.
        tasks: Vec<TaskName>,
        downstream: bool,
    },
    ResourceDeleted {
        task: TaskName,
        resource: ResourceName,
        location: String,
    },
    /// Nothing to delete: the output was already absent.
    ResourceAbsent {
        task: TaskName,
        resource: ResourceName,
        location: String,
    },
    TaskUndone {
        task: TaskName,
    },
}

/// Outcome of a successful `run`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Tasks whose computation was invoked, in execution order.
    pub executed: Vec<TaskName>,
    /// Tasks found up to date, in the order they were confirmed.
    pub skipped: Vec<TaskName>,
}

impl RunReport {
    pub fn was_executed(&self, task: &str) -> bool {
        self.executed.iter().any(|t| t == task)
    }

    pub fn was_skipped(&self, task: &str) -> bool {
        self.skipped.iter().any(|t| t == task)
    }
}

/// A resource removed by `undo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedResource {
    pub task: TaskName,
    pub resource: ResourceName,
    pub location: String,
}

/// Outcome of a successful `undo`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoReport {
    /// Tasks undone, consumers before producers.
    pub undone: Vec<TaskName>,
    /// Resources that existed and were deleted.
    pub deleted: Vec<DeletedResource>,
}
