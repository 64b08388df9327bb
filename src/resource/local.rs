// src/resource/local.rs

//! Default adapter for resources backed by a single local file.
//!
//! Concrete kinds only decide how bytes map to [`Data`](crate::types::Data);
//! existence and deletion are shared here.

use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::fs::{FileSystem, RealFileSystem};

#[derive(Debug, Clone, Default)]
pub struct LocalFile<F: FileSystem = RealFileSystem> {
    fs: F,
}

impl LocalFile<RealFileSystem> {
    pub fn new() -> Self {
        Self { fs: RealFileSystem }
    }
}

impl<F: FileSystem> LocalFile<F> {
    pub fn with_fs(fs: F) -> Self {
        Self { fs }
    }

    /// A resource exists when its location is a regular file.
    pub fn exists(&self, location: &str) -> Result<bool> {
        Ok(self.fs.is_file(Path::new(location)))
    }

    pub fn delete(&self, location: &str) -> Result<()> {
        debug!(location, "removing local file");
        self.fs.remove_file(Path::new(location))
    }

    pub fn read(&self, location: &str) -> Result<Vec<u8>> {
        self.fs.read(Path::new(location))
    }

    pub fn write(&self, location: &str, bytes: &[u8]) -> Result<()> {
        self.fs.write(Path::new(location), bytes)
    }
}
