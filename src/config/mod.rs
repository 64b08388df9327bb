// src/config/mod.rs

//! Context file loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a context file from disk (`loader.rs`).
//! - Validate keys and values before they reach the runtime context (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_optional};
pub use model::{ConfigFile, RawConfigFile};
pub use validate::validate_config;
