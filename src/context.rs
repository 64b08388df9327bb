// src/context.rs

//! Runtime context: invocation parameters threaded through a run.
//!
//! The context is used for two things:
//! - resolving `{name}` placeholders in resource location templates
//! - handing parameters to every task computation
//!
//! It is built once per invocation and only ever borrowed by the engine.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Context as _};

/// Immutable-during-execution mapping of invocation parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    values: BTreeMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.values.insert(key.into(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// Parse a context value into `T`.
    pub fn parse<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let raw = self
            .get(key)
            .ok_or_else(|| anyhow!("context has no value for '{key}'"))?;
        raw.parse::<T>()
            .with_context(|| format!("parsing context value '{key}' = {raw:?}"))
    }

    /// Overlay `other` on top of `self`; keys in `other` win.
    pub fn merge(mut self, other: &Context) -> Self {
        for (k, v) in other.values.iter() {
            self.values.insert(k.clone(), v.clone());
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Substitute context values into a `{name}` template.
    ///
    /// `{{` and `}}` stand for literal braces.
    pub fn render(&self, template: &str) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(template.len());
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    out.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    out.push('}');
                }
                '}' => return Err(TemplateError::UnmatchedClose),
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for n in chars.by_ref() {
                        if n == '}' {
                            closed = true;
                            break;
                        }
                        name.push(n);
                    }
                    if !closed {
                        return Err(TemplateError::UnclosedPlaceholder);
                    }
                    if !is_identifier(&name) {
                        return Err(TemplateError::InvalidPlaceholder(name));
                    }
                    match self.values.get(&name) {
                        Some(value) => out.push_str(value),
                        None => return Err(TemplateError::Unresolved(name)),
                    }
                }
                other => out.push(other),
            }
        }

        Ok(out)
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = Context::new();
        for (k, v) in iter {
            ctx.insert(k, v);
        }
        ctx
    }
}

/// Why a location template could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A placeholder names a key the context does not have.
    Unresolved(String),
    InvalidPlaceholder(String),
    UnclosedPlaceholder,
    UnmatchedClose,
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::Unresolved(name) => write!(f, "no context value for '{name}'"),
            TemplateError::InvalidPlaceholder(name) => {
                write!(f, "invalid placeholder name {name:?}")
            }
            TemplateError::UnclosedPlaceholder => f.write_str("unclosed '{'"),
            TemplateError::UnmatchedClose => f.write_str("unmatched '}'"),
        }
    }
}

/// Placeholder and context-key syntax: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
