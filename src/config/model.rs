// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::context::Context;

/// Context file exactly as read from TOML, before validation.
///
/// ```toml
/// [context]
/// data_dir = "data"
/// date = "2024-01-31"
/// limit = 10
/// ```
///
/// Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    /// Values seeded into the runtime context.
    #[serde(default)]
    pub context: BTreeMap<String, toml::Value>,
}

/// Validated context file.
///
/// Constructed through `TryFrom<RawConfigFile>`, which guarantees that every
/// key is a valid placeholder name and every value a scalar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    context: BTreeMap<String, String>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(context: BTreeMap<String, String>) -> Self {
        Self { context }
    }

    /// Context values rendered as strings.
    pub fn context_values(&self) -> &BTreeMap<String, String> {
        &self.context
    }

    pub fn to_context(&self) -> Context {
        self.context.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }
}
