// src/engine/observer.rs

//! Observer interface through which the engine reports its decisions.

use tracing::{debug, info};

use crate::engine::EngineEvent;

/// Receives every [`EngineEvent`] emitted during `run` and `undo`.
pub trait EngineObserver {
    fn notify(&self, event: &EngineEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl EngineObserver for NoopObserver {
    fn notify(&self, _event: &EngineEvent) {}
}

/// Forwards events to `tracing`. Used by the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl EngineObserver for TracingObserver {
    fn notify(&self, event: &EngineEvent) {
        match event {
            EngineEvent::RunStarted { targets } => {
                info!(?targets, "resolving targets");
            }
            EngineEvent::InputMissing {
                task,
                resource,
                location,
                producer,
            } => {
                debug!(
                    task = %task,
                    resource = %resource,
                    location = %location,
                    producer = %producer,
                    "input missing; resolving its producer first"
                );
            }
            EngineEvent::TaskSkipped { task } => {
                info!(task = %task, "all outputs exist; skipping");
            }
            EngineEvent::TaskStarted { task } => {
                info!(task = %task, "running task");
            }
            EngineEvent::ResourceLoaded {
                task,
                resource,
                location,
            } => {
                debug!(task = %task, resource = %resource, location = %location, "loaded input");
            }
            EngineEvent::ResourceSaved {
                task,
                resource,
                location,
            } => {
                debug!(task = %task, resource = %resource, location = %location, "saved output");
            }
            EngineEvent::TaskFinished { task } => {
                info!(task = %task, "task finished");
            }
            EngineEvent::RunFinished { executed, skipped } => {
                info!(executed, skipped, "run complete");
            }
            EngineEvent::UndoStarted { tasks, downstream } => {
                info!(?tasks, downstream, "undoing tasks");
            }
            EngineEvent::ResourceDeleted {
                task,
                resource,
                location,
            } => {
                info!(task = %task, resource = %resource, location = %location, "deleted output");
            }
            EngineEvent::ResourceAbsent {
                task,
                resource,
                location,
            } => {
                debug!(
                    task = %task,
                    resource = %resource,
                    location = %location,
                    "output already absent"
                );
            }
            EngineEvent::TaskUndone { task } => {
                debug!(task = %task, "task undone");
            }
        }
    }
}
