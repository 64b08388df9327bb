// src/errors.rs

//! Crate-wide error type and result alias.

use std::fmt;

use thiserror::Error;

use crate::types::{ResourceName, TaskName};

/// Boxed source error carried by the variants that wrap backend or task failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Duplicate producer: resource '{resource}' is produced by both '{first}' and '{second}'")]
    DuplicateProducer {
        resource: ResourceName,
        first: TaskName,
        second: TaskName,
    },

    #[error("Duplicate task: a task named '{0}' is already registered")]
    DuplicateTask(TaskName),

    #[error(
        "Conflicting definitions for resource '{resource}': location '{first}' vs '{second}'"
    )]
    ConflictingResource {
        resource: ResourceName,
        first: String,
        second: String,
    },

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Cyclic dependency: {}", .path.join(" -> "))]
    CyclicDependency { path: Vec<TaskName> },

    #[error(
        "Missing input: task '{task}' requires resource '{resource}' at '{location}', which does not exist and has no producer"
    )]
    MissingInput {
        task: TaskName,
        resource: ResourceName,
        location: String,
    },

    #[error("Assertion '{assertion}' failed for resource '{resource}' {stage}: {message}")]
    AssertionFailed {
        resource: ResourceName,
        assertion: String,
        stage: AssertionStage,
        message: String,
    },

    #[error("IO failure during {operation} of resource '{resource}' at '{location}': {source}")]
    IoFailure {
        resource: ResourceName,
        location: String,
        operation: IoOperation,
        #[source]
        source: BoxError,
    },

    #[error("Task '{task}' failed: {source}")]
    TaskFailed {
        task: TaskName,
        #[source]
        source: BoxError,
    },

    #[error("Task '{task}' did not produce declared output '{resource}'")]
    MissingOutput {
        task: TaskName,
        resource: ResourceName,
    },

    #[error("Task '{task}' produced '{resource}', which is not one of its declared outputs")]
    UndeclaredOutput {
        task: TaskName,
        resource: ResourceName,
    },

    #[error(
        "Unresolved placeholder '{{{placeholder}}}' in location '{template}' of resource '{resource}'"
    )]
    UnresolvedPlaceholder {
        resource: ResourceName,
        template: String,
        placeholder: String,
    },

    #[error("Invalid location template '{template}' of resource '{resource}': {reason}")]
    InvalidTemplate {
        resource: ResourceName,
        template: String,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Point in a resource's lifecycle at which an assertion ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertionStage {
    AfterLoad,
    BeforeSave,
}

impl fmt::Display for AssertionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssertionStage::AfterLoad => f.write_str("after load"),
            AssertionStage::BeforeSave => f.write_str("before save"),
        }
    }
}

/// Storage operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOperation {
    Exists,
    Load,
    Save,
    Delete,
}

impl fmt::Display for IoOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IoOperation::Exists => "existence check",
            IoOperation::Load => "load",
            IoOperation::Save => "save",
            IoOperation::Delete => "delete",
        };
        f.write_str(s)
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PipelineError>;
