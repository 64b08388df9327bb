// src/dag/graph.rs

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::dag::task::Task;
use crate::errors::{PipelineError, Result};
use crate::types::{ResourceName, TaskName};

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone, Default)]
struct DagNode {
    /// Direct dependencies: tasks producing a resource this one consumes.
    deps: Vec<TaskName>,
    /// Direct dependents: tasks consuming a resource this one produces.
    dependents: Vec<TaskName>,
}

/// A producer → consumer relation, labelled with the resource that links them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DagEdge {
    pub producer: TaskName,
    pub consumer: TaskName,
    pub resource: ResourceName,
}

/// Dependency graph derived from the registered tasks.
///
/// Edges exist only where one task declares an output that another declares
/// as input. Acyclicity is not enforced here: it is checked when a run is
/// planned, so that `ls` and `dot` still work on a broken pipeline.
#[derive(Debug, Clone)]
pub struct DagGraph {
    /// Task names in registration order.
    order: Vec<TaskName>,
    nodes: HashMap<TaskName, DagNode>,
    producers: HashMap<ResourceName, TaskName>,
    edges: Vec<DagEdge>,
}

impl DagGraph {
    /// Build the graph from the registered tasks.
    ///
    /// Fails if two tasks declare the same output, or if two declarations of
    /// one resource name disagree on the location template.
    pub fn build(tasks: &[Task]) -> Result<Self> {
        let mut nodes: HashMap<TaskName, DagNode> = HashMap::new();
        let mut producers: HashMap<ResourceName, TaskName> = HashMap::new();
        let mut locations: HashMap<&str, &str> = HashMap::new();

        // First pass: producers, and one location per resource name.
        for task in tasks {
            nodes.insert(task.name().to_string(), DagNode::default());

            for resource in task.inputs().iter().chain(task.outputs()) {
                let location = resource.location_template();
                match locations.get(resource.name()) {
                    Some(&known) if known != location => {
                        return Err(PipelineError::ConflictingResource {
                            resource: resource.name().to_string(),
                            first: known.to_string(),
                            second: location.to_string(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        locations.insert(resource.name(), location);
                    }
                }
            }

            for output in task.outputs() {
                if let Some(first) = producers.get(output.name()) {
                    return Err(PipelineError::DuplicateProducer {
                        resource: output.name().to_string(),
                        first: first.clone(),
                        second: task.name().to_string(),
                    });
                }
                producers.insert(output.name().to_string(), task.name().to_string());
            }
        }

        // Second pass: edges from producers to consumers.
        let mut edges = Vec::new();
        for task in tasks {
            for input in task.inputs() {
                let Some(producer) = producers.get(input.name()) else {
                    continue;
                };

                edges.push(DagEdge {
                    producer: producer.clone(),
                    consumer: task.name().to_string(),
                    resource: input.name().to_string(),
                });

                if let Some(node) = nodes.get_mut(task.name()) {
                    if !node.deps.contains(producer) {
                        node.deps.push(producer.clone());
                    }
                }
                if let Some(node) = nodes.get_mut(producer) {
                    if !node.dependents.iter().any(|d| d == task.name()) {
                        node.dependents.push(task.name().to_string());
                    }
                }
            }
        }

        debug!(
            tasks = nodes.len(),
            resources = producers.len(),
            edges = edges.len(),
            "built dependency graph"
        );

        Ok(Self {
            order: tasks.iter().map(|t| t.name().to_string()).collect(),
            nodes,
            producers,
            edges,
        })
    }

    /// All task names, in registration order.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn contains(&self, task: &str) -> bool {
        self.nodes.contains_key(task)
    }

    /// The task declaring `resource` as output, if any.
    pub fn producer_of(&self, resource: &str) -> Option<&str> {
        self.producers.get(resource).map(|s| s.as_str())
    }

    /// Immediate upstream tasks (producers of this task's inputs).
    pub fn dependencies_of(&self, task: &str) -> &[TaskName] {
        self.nodes
            .get(task)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate downstream tasks (consumers of this task's outputs).
    pub fn consumers_of(&self, task: &str) -> &[TaskName] {
        self.nodes
            .get(task)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Every labelled producer → consumer edge.
    pub fn edges(&self) -> &[DagEdge] {
        &self.edges
    }

    /// Transitive producers of `task`, excluding `task` itself unless it sits on a cycle.
    pub fn upstream_of(&self, task: &str) -> BTreeSet<TaskName> {
        self.closure(task, |name| self.dependencies_of(name))
    }

    /// Transitive consumers of `task`, excluding `task` itself unless it sits on a cycle.
    pub fn downstream_of(&self, task: &str) -> BTreeSet<TaskName> {
        self.closure(task, |name| self.consumers_of(name))
    }

    fn closure<'a>(
        &'a self,
        root: &str,
        next: impl Fn(&str) -> &'a [TaskName],
    ) -> BTreeSet<TaskName> {
        let mut found = BTreeSet::new();
        let mut queue: VecDeque<&str> = next(root).iter().map(|s| s.as_str()).collect();

        while let Some(name) = queue.pop_front() {
            if found.insert(name.to_string()) {
                queue.extend(next(name).iter().map(|s| s.as_str()));
            }
        }

        found
    }

    /// Topologically order `subset` (producers first) using only the edges
    /// between its members.
    ///
    /// Fails with `CyclicDependency` if the induced subgraph has a cycle.
    pub fn topological_order(&self, subset: &HashSet<&str>) -> Result<Vec<TaskName>> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        // Registration order keeps the result deterministic for unrelated tasks.
        for name in self.order.iter().filter(|n| subset.contains(n.as_str())) {
            graph.add_node(name.as_str());
        }
        for name in self.order.iter().filter(|n| subset.contains(n.as_str())) {
            for dep in self.dependencies_of(name) {
                if subset.contains(dep.as_str()) {
                    graph.add_edge(dep.as_str(), name.as_str(), ());
                }
            }
        }

        match toposort(&graph, None) {
            Ok(order) => Ok(order.into_iter().map(|s| s.to_string()).collect()),
            Err(cycle) => {
                let node = cycle.node_id();
                Err(PipelineError::CyclicDependency {
                    path: self.cycle_through(node, subset),
                })
            }
        }
    }

    /// Best-effort cycle path starting and ending at `start`, for error reports.
    fn cycle_through(&self, start: &str, subset: &HashSet<&str>) -> Vec<TaskName> {
        let mut parent: HashMap<&str, &str> = HashMap::new();
        let mut queue: VecDeque<&str> = VecDeque::from([start]);
        let mut seen: HashSet<&str> = HashSet::from([start]);

        while let Some(name) = queue.pop_front() {
            for next in self.consumers_of(name) {
                let next = next.as_str();
                if !subset.contains(next) {
                    continue;
                }
                if next == start {
                    let mut middle = Vec::new();
                    let mut cur = name;
                    while cur != start {
                        middle.push(cur.to_string());
                        cur = parent.get(cur).copied().unwrap_or(start);
                    }
                    middle.reverse();

                    let mut path = vec![start.to_string()];
                    path.extend(middle);
                    path.push(start.to_string());
                    return path;
                }
                if seen.insert(next) {
                    parent.insert(next, name);
                    queue.push_back(next);
                }
            }
        }

        vec![start.to_string()]
    }
}
