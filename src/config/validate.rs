// src/config/validate.rs

use std::collections::BTreeMap;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::context::is_identifier;
use crate::errors::{PipelineError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::PipelineError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;

        let mut context = BTreeMap::new();
        for (key, value) in raw.context.iter() {
            context.insert(key.clone(), render_scalar(key, value)?);
        }
        Ok(ConfigFile::new_unchecked(context))
    }
}

/// Check a raw context file without converting it.
pub fn validate_config(raw: &RawConfigFile) -> Result<()> {
    validate_raw_config(raw)
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_context_keys(cfg)?;
    validate_context_values(cfg)?;
    Ok(())
}

fn validate_context_keys(cfg: &RawConfigFile) -> Result<()> {
    for key in cfg.context.keys() {
        if !is_identifier(key) {
            return Err(PipelineError::ConfigError(format!(
                "[context] key '{}' is not a valid placeholder name (expected [A-Za-z_][A-Za-z0-9_]*)",
                key
            )));
        }
    }
    Ok(())
}

fn validate_context_values(cfg: &RawConfigFile) -> Result<()> {
    for (key, value) in cfg.context.iter() {
        render_scalar(key, value)?;
    }
    Ok(())
}

/// String form of a scalar TOML value, as substituted into templates.
fn render_scalar(key: &str, value: &toml::Value) -> Result<String> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Datetime(d) => Ok(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => Err(PipelineError::ConfigError(format!(
            "[context].{} must be a string, number, boolean or datetime (got {})",
            key,
            value.type_str()
        ))),
    }
}
