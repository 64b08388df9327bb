// src/resource/cbor.rs

use anyhow::{anyhow, Result};

use crate::fs::{FileSystem, RealFileSystem};
use crate::resource::{LocalFile, Storage};
use crate::types::Data;

/// Opaque binary snapshot of arbitrary data, encoded as CBOR.
#[derive(Debug, Clone, Default)]
pub struct CborFile<F: FileSystem = RealFileSystem> {
    file: LocalFile<F>,
}

impl CborFile<RealFileSystem> {
    pub fn new() -> Self {
        Self {
            file: LocalFile::new(),
        }
    }
}

impl<F: FileSystem> CborFile<F> {
    pub fn with_fs(fs: F) -> Self {
        Self {
            file: LocalFile::with_fs(fs),
        }
    }
}

impl<F: FileSystem> Storage for CborFile<F> {
    fn exists(&self, location: &str) -> Result<bool> {
        self.file.exists(location)
    }

    fn load(&self, location: &str) -> Result<Data> {
        let bytes = self.file.read(location)?;
        ciborium::de::from_reader(bytes.as_slice())
            .map_err(|e| anyhow!("decoding CBOR from '{location}': {e:?}"))
    }

    fn save(&self, location: &str, data: &Data) -> Result<()> {
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(data, &mut bytes)
            .map_err(|e| anyhow!("encoding CBOR for '{location}': {e:?}"))?;
        self.file.write(location, &bytes)
    }

    fn delete(&self, location: &str) -> Result<()> {
        self.file.delete(location)
    }
}
