// src/resource/json.rs

use anyhow::{anyhow, Context, Result};

use crate::fs::{FileSystem, RealFileSystem};
use crate::resource::{LocalFile, Storage};
use crate::types::Data;

/// A whole JSON document in one file.
#[derive(Debug, Clone, Default)]
pub struct JsonFile<F: FileSystem = RealFileSystem> {
    file: LocalFile<F>,
}

impl JsonFile<RealFileSystem> {
    pub fn new() -> Self {
        Self {
            file: LocalFile::new(),
        }
    }
}

impl<F: FileSystem> JsonFile<F> {
    pub fn with_fs(fs: F) -> Self {
        Self {
            file: LocalFile::with_fs(fs),
        }
    }
}

impl<F: FileSystem> Storage for JsonFile<F> {
    fn exists(&self, location: &str) -> Result<bool> {
        self.file.exists(location)
    }

    fn load(&self, location: &str) -> Result<Data> {
        let bytes = self.file.read(location)?;
        serde_json::from_slice(&bytes).with_context(|| format!("parsing JSON from '{location}'"))
    }

    fn save(&self, location: &str, data: &Data) -> Result<()> {
        let mut bytes = serde_json::to_vec_pretty(data).context("encoding JSON")?;
        bytes.push(b'\n');
        self.file.write(location, &bytes)
    }

    fn delete(&self, location: &str) -> Result<()> {
        self.file.delete(location)
    }
}

/// Tabular data stored as one JSON object per line.
///
/// In memory the table is an array of records; pair it with
/// [`Resource::with_fields`](crate::resource::Resource::with_fields) to pin
/// the column set.
#[derive(Debug, Clone, Default)]
pub struct JsonLinesFile<F: FileSystem = RealFileSystem> {
    file: LocalFile<F>,
}

impl JsonLinesFile<RealFileSystem> {
    pub fn new() -> Self {
        Self {
            file: LocalFile::new(),
        }
    }
}

impl<F: FileSystem> JsonLinesFile<F> {
    pub fn with_fs(fs: F) -> Self {
        Self {
            file: LocalFile::with_fs(fs),
        }
    }
}

impl<F: FileSystem> Storage for JsonLinesFile<F> {
    fn exists(&self, location: &str) -> Result<bool> {
        self.file.exists(location)
    }

    fn load(&self, location: &str) -> Result<Data> {
        let bytes = self.file.read(location)?;
        let text = String::from_utf8(bytes)
            .with_context(|| format!("reading '{location}' as UTF-8"))?;

        let mut rows = Vec::new();
        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row: Data = serde_json::from_str(line)
                .with_context(|| format!("parsing line {} of '{location}'", i + 1))?;
            rows.push(row);
        }
        Ok(Data::Array(rows))
    }

    fn save(&self, location: &str, data: &Data) -> Result<()> {
        let rows = data
            .as_array()
            .ok_or_else(|| anyhow!("table data for '{location}' must be an array of records"))?;

        let mut bytes = Vec::new();
        for row in rows {
            serde_json::to_writer(&mut bytes, row).context("encoding table row")?;
            bytes.push(b'\n');
        }
        self.file.write(location, &bytes)
    }

    fn delete(&self, location: &str) -> Result<()> {
        self.file.delete(location)
    }
}
