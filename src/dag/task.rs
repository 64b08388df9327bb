// src/dag/task.rs

//! Task descriptors: a named computation plus its declared resources.

use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::resource::Resource;
use crate::types::{Inputs, Outputs, TaskName};

/// The computation wrapped by a task.
///
/// Any `Fn(&Inputs, &Context) -> anyhow::Result<Outputs>` closure or function
/// implements this.
pub trait Computation: Send + Sync {
    fn compute(&self, inputs: &Inputs, context: &Context) -> anyhow::Result<Outputs>;
}

impl<F> Computation for F
where
    F: Fn(&Inputs, &Context) -> anyhow::Result<Outputs> + Send + Sync,
{
    fn compute(&self, inputs: &Inputs, context: &Context) -> anyhow::Result<Outputs> {
        self(inputs, context)
    }
}

/// A named unit of computation with ordered inputs and outputs.
pub struct Task {
    name: TaskName,
    inputs: Vec<Arc<Resource>>,
    outputs: Vec<Arc<Resource>>,
    computation: Box<dyn Computation>,
}

impl Task {
    /// Start declaring a task named `name` that runs the closure `f`.
    pub fn builder<F>(name: impl Into<TaskName>, f: F) -> TaskBuilder
    where
        F: Fn(&Inputs, &Context) -> anyhow::Result<Outputs> + Send + Sync + 'static,
    {
        Self::with_computation(name, f)
    }

    /// Like [`Task::builder`], for types implementing [`Computation`] directly.
    pub fn with_computation(
        name: impl Into<TaskName>,
        computation: impl Computation + 'static,
    ) -> TaskBuilder {
        TaskBuilder {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            computation: Box::new(computation),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[Arc<Resource>] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Arc<Resource>] {
        &self.outputs
    }

    pub fn compute(&self, inputs: &Inputs, context: &Context) -> anyhow::Result<Outputs> {
        self.computation.compute(inputs, context)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |rs: &[Arc<Resource>]| rs.iter().map(|r| r.name().to_string()).collect::<Vec<_>>();
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("inputs", &names(&self.inputs))
            .field("outputs", &names(&self.outputs))
            .finish()
    }
}

/// Builder returned by [`Task::builder`] and the [`task!`](crate::task) macro.
pub struct TaskBuilder {
    name: TaskName,
    inputs: Vec<Arc<Resource>>,
    outputs: Vec<Arc<Resource>>,
    computation: Box<dyn Computation>,
}

impl TaskBuilder {
    /// Declare the next input. Inputs are loaded in declaration order.
    pub fn input(mut self, resource: &Arc<Resource>) -> Self {
        self.inputs.push(Arc::clone(resource));
        self
    }

    /// Declare the next output. Outputs are saved in declaration order.
    pub fn output(mut self, resource: &Arc<Resource>) -> Self {
        self.outputs.push(Arc::clone(resource));
        self
    }

    pub fn build(self) -> Task {
        Task {
            name: self.name,
            inputs: self.inputs,
            outputs: self.outputs,
            computation: self.computation,
        }
    }
}

/// Declare a task named after the function that implements it.
///
/// ```ignore
/// fn square_numbers(inputs: &Inputs, ctx: &Context) -> anyhow::Result<Outputs> { ... }
///
/// let task = task!(square_numbers).input(&numbers).output(&squares).build();
/// assert_eq!(task.name(), "square_numbers");
/// ```
#[macro_export]
macro_rules! task {
    ($func:ident) => {
        $crate::dag::Task::builder(stringify!($func), $func)
    };
}
