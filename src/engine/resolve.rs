// src/engine/resolve.rs

//! Upstream resolution and execution.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::context::Context;
use crate::dag::{DagGraph, Task};
use crate::engine::{EngineEvent, EngineObserver, RunReport, TaskState};
use crate::errors::{PipelineError, Result};
use crate::pipeline::Pipeline;
use crate::types::{Inputs, TaskName};

/// Make the outputs of `targets` exist, running only what is missing.
///
/// An empty `targets` slice means every registered task, in registration
/// order. Each task runs at most once per call. The first error aborts the
/// whole run; outputs saved before it stay where they are.
pub fn run(
    pipeline: &Pipeline,
    targets: &[&str],
    context: &Context,
    observer: &dyn EngineObserver,
) -> Result<RunReport> {
    let graph = pipeline.graph()?;
    let targets = select_targets(graph, targets)?;

    observer.notify(&EngineEvent::RunStarted {
        targets: targets.clone(),
    });

    // Nothing may run if a cycle is reachable from any target.
    ensure_acyclic_upstream(graph, &targets)?;

    let mut resolver = Resolver::new(pipeline, graph, context, observer);
    for target in targets.iter() {
        resolver.ensure(target)?;
    }

    let report = resolver.report;
    observer.notify(&EngineEvent::RunFinished {
        executed: report.executed.len(),
        skipped: report.skipped.len(),
    });
    Ok(report)
}

/// Validate requested names, dropping repeats but keeping the given order.
fn select_targets(graph: &DagGraph, targets: &[&str]) -> Result<Vec<TaskName>> {
    if targets.is_empty() {
        return Ok(graph.tasks().map(|s| s.to_string()).collect());
    }

    let mut seen = HashSet::new();
    let mut selected = Vec::new();
    for &name in targets {
        if !graph.contains(name) {
            return Err(PipelineError::TaskNotFound(name.to_string()));
        }
        if seen.insert(name) {
            selected.push(name.to_string());
        }
    }
    Ok(selected)
}

fn ensure_acyclic_upstream(graph: &DagGraph, targets: &[TaskName]) -> Result<()> {
    let mut reachable: BTreeSet<TaskName> = BTreeSet::new();
    for target in targets {
        reachable.insert(target.clone());
        reachable.extend(graph.upstream_of(target));
    }

    let subset: HashSet<&str> = reachable.iter().map(|s| s.as_str()).collect();
    graph.topological_order(&subset).map(|_| ())
}

/// Depth-first upstream walk with per-invocation memoization.
struct Resolver<'a> {
    pipeline: &'a Pipeline,
    graph: &'a DagGraph,
    context: &'a Context,
    observer: &'a dyn EngineObserver,
    states: HashMap<TaskName, TaskState>,
    /// Tasks currently being resolved, outermost first.
    stack: Vec<TaskName>,
    report: RunReport,
}

impl<'a> Resolver<'a> {
    fn new(
        pipeline: &'a Pipeline,
        graph: &'a DagGraph,
        context: &'a Context,
        observer: &'a dyn EngineObserver,
    ) -> Self {
        Self {
            pipeline,
            graph,
            context,
            observer,
            states: HashMap::new(),
            stack: Vec::new(),
            report: RunReport::default(),
        }
    }

    fn ensure(&mut self, name: &str) -> Result<()> {
        match self.states.get(name) {
            Some(TaskState::Done) => return Ok(()),
            Some(TaskState::Visiting) => return Err(self.cycle_error(name)),
            None => {}
        }

        let pipeline = self.pipeline;
        let graph = self.graph;
        let task = pipeline
            .task(name)
            .ok_or_else(|| PipelineError::TaskNotFound(name.to_string()))?;

        self.states.insert(name.to_string(), TaskState::Visiting);
        self.stack.push(name.to_string());

        for input in task.inputs() {
            let location = input.location(self.context)?;
            if input.exists_at(&location)? {
                continue;
            }

            match graph.producer_of(input.name()) {
                Some(producer) => {
                    self.observer.notify(&EngineEvent::InputMissing {
                        task: name.to_string(),
                        resource: input.name().to_string(),
                        location,
                        producer: producer.to_string(),
                    });
                    self.ensure(producer)?;
                }
                None => {
                    return Err(PipelineError::MissingInput {
                        task: name.to_string(),
                        resource: input.name().to_string(),
                        location,
                    });
                }
            }
        }

        if self.is_up_to_date(task)? {
            self.observer.notify(&EngineEvent::TaskSkipped {
                task: name.to_string(),
            });
            self.report.skipped.push(name.to_string());
        } else {
            self.execute(task)?;
            self.report.executed.push(name.to_string());
        }

        self.stack.pop();
        self.states.insert(name.to_string(), TaskState::Done);
        Ok(())
    }

    /// A task is up to date when it declares outputs and all of them exist.
    /// Zero-output tasks are never up to date.
    fn is_up_to_date(&self, task: &Task) -> Result<bool> {
        if task.outputs().is_empty() {
            return Ok(false);
        }
        for output in task.outputs() {
            if !output.exists(self.context)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn execute(&mut self, task: &Task) -> Result<()> {
        let name = task.name();
        self.observer.notify(&EngineEvent::TaskStarted {
            task: name.to_string(),
        });

        let mut inputs = Inputs::new();
        for input in task.inputs() {
            let location = input.location(self.context)?;
            let data = input.load_at(&location)?;
            self.observer.notify(&EngineEvent::ResourceLoaded {
                task: name.to_string(),
                resource: input.name().to_string(),
                location,
            });
            inputs.insert(input.name(), data);
        }

        let mut outputs = task
            .compute(&inputs, self.context)
            .map_err(|e| PipelineError::TaskFailed {
                task: name.to_string(),
                source: e.into(),
            })?;

        // Check the whole result before anything is written.
        for produced in outputs.names() {
            if !task.outputs().iter().any(|o| o.name() == produced) {
                return Err(PipelineError::UndeclaredOutput {
                    task: name.to_string(),
                    resource: produced.to_string(),
                });
            }
        }
        for output in task.outputs() {
            if !outputs.names().any(|n| n == output.name()) {
                return Err(PipelineError::MissingOutput {
                    task: name.to_string(),
                    resource: output.name().to_string(),
                });
            }
        }

        for output in task.outputs() {
            let location = output.location(self.context)?;
            let data = outputs
                .take(output.name())
                .ok_or_else(|| PipelineError::MissingOutput {
                    task: name.to_string(),
                    resource: output.name().to_string(),
                })?;
            output.save_at(&location, &data)?;
            self.observer.notify(&EngineEvent::ResourceSaved {
                task: name.to_string(),
                resource: output.name().to_string(),
                location,
            });
        }

        self.observer.notify(&EngineEvent::TaskFinished {
            task: name.to_string(),
        });
        Ok(())
    }

    /// `name` was re-entered while still on the stack.
    fn cycle_error(&self, name: &str) -> PipelineError {
        let start = self
            .stack
            .iter()
            .position(|t| t == name)
            .unwrap_or(0);
        let mut path: Vec<TaskName> = self.stack[start..].to_vec();
        path.push(name.to_string());
        PipelineError::CyclicDependency { path }
    }
}
