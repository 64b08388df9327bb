// src/dag/mod.rs

//! Task descriptors and the dependency graph derived from them.
//!
//! - [`task`] holds the task descriptor, its builder and the
//!   [`Computation`] trait.
//! - [`graph`] derives producer → consumer edges from shared resources
//!   and answers the upstream/downstream queries used by the engine.

pub mod graph;
pub mod task;

pub use graph::{DagEdge, DagGraph};
pub use task::{Computation, Task, TaskBuilder};
