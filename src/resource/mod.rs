// src/resource/mod.rs

//! Resources: named, location-templated artifacts.
//!
//! - [`Storage`] is the capability contract every backend implements
//!   (exists / load / save / delete on a resolved location).
//! - [`Resource`] binds a name and a location template to a storage backend,
//!   and runs structural field checks plus assertion predicates after every
//!   load and before every save.
//! - [`local`] provides the default local-file adapter, and the concrete
//!   kinds ([`JsonFile`], [`JsonLinesFile`], [`CborFile`]) delegate to it.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use anyhow::bail;

use crate::context::{Context, TemplateError};
use crate::errors::{AssertionStage, IoOperation, PipelineError, Result};
use crate::types::{Data, ResourceName};

pub mod cbor;
pub mod json;
pub mod local;

pub use cbor::CborFile;
pub use json::{JsonFile, JsonLinesFile};
pub use local::LocalFile;

/// Storage contract for a resource kind.
///
/// All methods receive the already-resolved location.
pub trait Storage: Send + Sync + fmt::Debug {
    fn exists(&self, location: &str) -> anyhow::Result<bool>;

    fn load(&self, location: &str) -> anyhow::Result<Data>;

    fn save(&self, location: &str, data: &Data) -> anyhow::Result<()>;

    /// Remove the data at `location`.
    ///
    /// Kinds that cannot delete keep this default, which makes undo fail loudly.
    fn delete(&self, location: &str) -> anyhow::Result<()> {
        bail!("storage kind does not support deleting '{location}'")
    }
}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn exists(&self, location: &str) -> anyhow::Result<bool> {
        (**self).exists(location)
    }

    fn load(&self, location: &str) -> anyhow::Result<Data> {
        (**self).load(location)
    }

    fn save(&self, location: &str, data: &Data) -> anyhow::Result<()> {
        (**self).save(location, data)
    }

    fn delete(&self, location: &str) -> anyhow::Result<()> {
        (**self).delete(location)
    }
}

type Predicate = dyn Fn(&Data) -> std::result::Result<(), String> + Send + Sync;

/// A named predicate run on a resource's data after load and before save.
#[derive(Clone)]
pub struct Assertion {
    name: String,
    check: Arc<Predicate>,
}

impl Assertion {
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Data) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn check(&self, data: &Data) -> std::result::Result<(), String> {
        (self.check)(data)
    }
}

impl fmt::Debug for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assertion").field("name", &self.name).finish()
    }
}

/// Name of the built-in assertion that enforces declared fields.
pub const FIELDS_ASSERTION: &str = "fields";

/// A resource declaration, shared between its producer and its consumers.
pub struct Resource {
    name: ResourceName,
    location: String,
    fields: Option<Vec<String>>,
    assertions: Vec<Assertion>,
    storage: Arc<dyn Storage>,
}

impl Resource {
    pub fn new(
        name: impl Into<ResourceName>,
        location: impl Into<String>,
        storage: impl Storage + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            fields: None,
            assertions: Vec::new(),
            storage: Arc::new(storage),
        }
    }

    /// Require the data to carry exactly these field names.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_assertion<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Data) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.assertions.push(Assertion::new(name, check));
        self
    }

    /// Finish the declaration so it can be shared between tasks.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location_template(&self) -> &str {
        &self.location
    }

    pub fn fields(&self) -> Option<&[String]> {
        self.fields.as_deref()
    }

    pub fn assertions(&self) -> &[Assertion] {
        &self.assertions
    }

    /// Resolve the location template against the context.
    pub fn location(&self, ctx: &Context) -> Result<String> {
        ctx.render(&self.location).map_err(|e| match e {
            TemplateError::Unresolved(placeholder) => PipelineError::UnresolvedPlaceholder {
                resource: self.name.clone(),
                template: self.location.clone(),
                placeholder,
            },
            other => PipelineError::InvalidTemplate {
                resource: self.name.clone(),
                template: self.location.clone(),
                reason: other.to_string(),
            },
        })
    }

    pub fn exists(&self, ctx: &Context) -> Result<bool> {
        self.exists_at(&self.location(ctx)?)
    }

    pub fn load(&self, ctx: &Context) -> Result<Data> {
        self.load_at(&self.location(ctx)?)
    }

    pub fn save(&self, ctx: &Context, data: &Data) -> Result<()> {
        self.save_at(&self.location(ctx)?, data)
    }

    /// Delete the data if present. Returns whether anything was deleted.
    pub fn delete(&self, ctx: &Context) -> Result<bool> {
        self.delete_at(&self.location(ctx)?)
    }

    pub fn exists_at(&self, location: &str) -> Result<bool> {
        self.storage
            .exists(location)
            .map_err(|e| self.io_failure(location, IoOperation::Exists, e))
    }

    pub fn load_at(&self, location: &str) -> Result<Data> {
        let data = self
            .storage
            .load(location)
            .map_err(|e| self.io_failure(location, IoOperation::Load, e))?;
        self.check_integrity(&data, AssertionStage::AfterLoad)?;
        Ok(data)
    }

    pub fn save_at(&self, location: &str, data: &Data) -> Result<()> {
        self.check_integrity(data, AssertionStage::BeforeSave)?;
        self.storage
            .save(location, data)
            .map_err(|e| self.io_failure(location, IoOperation::Save, e))
    }

    pub fn delete_at(&self, location: &str) -> Result<bool> {
        if !self.exists_at(location)? {
            return Ok(false);
        }
        self.storage
            .delete(location)
            .map_err(|e| self.io_failure(location, IoOperation::Delete, e))?;
        Ok(true)
    }

    /// Run the field check and every assertion against `data`.
    pub fn check_integrity(&self, data: &Data, stage: AssertionStage) -> Result<()> {
        if let Err(message) = self.check_fields(data) {
            return Err(PipelineError::AssertionFailed {
                resource: self.name.clone(),
                assertion: FIELDS_ASSERTION.to_string(),
                stage,
                message,
            });
        }

        for assertion in self.assertions.iter() {
            if let Err(message) = assertion.check(data) {
                return Err(PipelineError::AssertionFailed {
                    resource: self.name.clone(),
                    assertion: assertion.name().to_string(),
                    stage,
                    message,
                });
            }
        }

        Ok(())
    }

    fn check_fields(&self, data: &Data) -> std::result::Result<(), String> {
        let Some(fields) = self.fields.as_ref() else {
            return Ok(());
        };
        let expected: BTreeSet<&str> = fields.iter().map(|s| s.as_str()).collect();

        let compare = |present: BTreeSet<&str>| {
            if present == expected {
                Ok(())
            } else {
                Err(format!(
                    "fields do not match. Present: {:?}. Expected: {:?}.",
                    present, expected
                ))
            }
        };

        match data {
            Data::Object(map) => compare(map.keys().map(|k| k.as_str()).collect()),
            Data::Array(rows) => {
                for (i, row) in rows.iter().enumerate() {
                    match row {
                        Data::Object(map) => compare(map.keys().map(|k| k.as_str()).collect())
                            .map_err(|m| format!("row {i}: {m}"))?,
                        _ => return Err(format!("row {i} is not a record")),
                    }
                }
                Ok(())
            }
            _ => Err("expected a record or a table of records".to_string()),
        }
    }

    fn io_failure(
        &self,
        location: &str,
        operation: IoOperation,
        err: anyhow::Error,
    ) -> PipelineError {
        PipelineError::IoFailure {
            resource: self.name.clone(),
            location: location.to_string(),
            operation,
            source: err.into(),
        }
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field("location", &self.location)
            .field("fields", &self.fields)
            .field("assertions", &self.assertions)
            .field("storage", &self.storage)
            .finish()
    }
}
