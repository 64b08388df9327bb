// src/engine/undo.rs

//! Output deletion with optional downstream cascade.

use std::collections::{BTreeSet, HashSet};

use crate::context::Context;
use crate::dag::{DagGraph, Task};
use crate::engine::{DeletedResource, EngineEvent, EngineObserver, UndoReport};
use crate::errors::{PipelineError, Result};
use crate::pipeline::Pipeline;
use crate::types::TaskName;

/// Delete the declared outputs of `target`.
///
/// With `downstream`, every transitive consumer of `target` is undone as
/// well, and always before the tasks it consumes from. With no target, every
/// registered task is undone, consumers first. Absent outputs are skipped.
pub fn undo(
    pipeline: &Pipeline,
    target: Option<&str>,
    context: &Context,
    downstream: bool,
    observer: &dyn EngineObserver,
) -> Result<UndoReport> {
    let graph = pipeline.graph()?;
    let order = undo_order(graph, target, downstream)?;

    observer.notify(&EngineEvent::UndoStarted {
        tasks: order.clone(),
        downstream,
    });

    let mut report = UndoReport::default();
    for name in order.iter() {
        let task = pipeline
            .task(name)
            .ok_or_else(|| PipelineError::TaskNotFound(name.clone()))?;
        undo_task(task, context, observer, &mut report)?;
    }

    Ok(report)
}

/// Tasks to undo, consumers before producers.
fn undo_order(graph: &DagGraph, target: Option<&str>, downstream: bool) -> Result<Vec<TaskName>> {
    let members: BTreeSet<TaskName> = match target {
        Some(name) => {
            if !graph.contains(name) {
                return Err(PipelineError::TaskNotFound(name.to_string()));
            }
            if !downstream {
                return Ok(vec![name.to_string()]);
            }
            let mut members = graph.downstream_of(name);
            members.insert(name.to_string());
            members
        }
        None => graph.tasks().map(|s| s.to_string()).collect(),
    };

    let subset: HashSet<&str> = members.iter().map(|s| s.as_str()).collect();
    let mut order = graph.topological_order(&subset)?;
    order.reverse();
    Ok(order)
}

fn undo_task(
    task: &Task,
    context: &Context,
    observer: &dyn EngineObserver,
    report: &mut UndoReport,
) -> Result<()> {
    for output in task.outputs() {
        let location = output.location(context)?;
        if output.delete_at(&location)? {
            observer.notify(&EngineEvent::ResourceDeleted {
                task: task.name().to_string(),
                resource: output.name().to_string(),
                location: location.clone(),
            });
            report.deleted.push(DeletedResource {
                task: task.name().to_string(),
                resource: output.name().to_string(),
                location,
            });
        } else {
            observer.notify(&EngineEvent::ResourceAbsent {
                task: task.name().to_string(),
                resource: output.name().to_string(),
                location,
            });
        }
    }

    observer.notify(&EngineEvent::TaskUndone {
        task: task.name().to_string(),
    });
    report.undone.push(task.name().to_string());
    Ok(())
}
