// src/types.rs

//! Names and data containers shared by every layer of the pipeline.

use std::collections::BTreeMap;

use anyhow::{anyhow, Context as _};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Canonical resource name type used throughout the crate.
pub type ResourceName = String;

/// In-memory data object exchanged between storage, assertions and tasks.
///
/// Records are JSON objects; tables are arrays of objects.
pub type Data = serde_json::Value;

/// Loaded input resources handed to a task computation, keyed by resource name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs {
    values: BTreeMap<ResourceName, Data>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: impl Into<ResourceName>, data: Data) {
        self.values.insert(name.into(), data);
    }

    /// Borrow the loaded data of an input resource.
    pub fn get(&self, name: &str) -> anyhow::Result<&Data> {
        self.values
            .get(name)
            .ok_or_else(|| anyhow!("input resource '{name}' was not loaded for this task"))
    }

    /// Deserialize an input resource into a typed value.
    pub fn parse<T: DeserializeOwned>(&self, name: &str) -> anyhow::Result<T> {
        let data = self.get(name)?;
        T::deserialize(data).with_context(|| format!("decoding input resource '{name}'"))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Values produced by a task computation, keyed by output resource name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outputs {
    values: BTreeMap<ResourceName, Data>,
}

impl Outputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for tasks that declare a single output.
    pub fn single(name: impl Into<ResourceName>, data: impl Into<Data>) -> Self {
        Self::new().with(name, data)
    }

    pub fn with(mut self, name: impl Into<ResourceName>, data: impl Into<Data>) -> Self {
        self.insert(name, data);
        self
    }

    /// Serialize a typed value into the named output.
    pub fn with_serialized<T: Serialize>(
        self,
        name: impl Into<ResourceName>,
        value: &T,
    ) -> anyhow::Result<Self> {
        let name = name.into();
        let data = serde_json::to_value(value)
            .with_context(|| format!("encoding output resource '{name}'"))?;
        Ok(self.with(name, data))
    }

    pub fn insert(&mut self, name: impl Into<ResourceName>, data: impl Into<Data>) {
        self.values.insert(name.into(), data.into());
    }

    pub(crate) fn take(&mut self, name: &str) -> Option<Data> {
        self.values.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
