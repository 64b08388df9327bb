use std::sync::{Arc, Mutex};

use dagmake::{Data, Storage};

/// Calls observed by a [`CountingStorage`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageCounts {
    pub exists: usize,
    pub loads: usize,
    pub saves: usize,
    pub deletes: usize,
}

/// Wraps a storage kind and counts every call that reaches it.
///
/// Clones share the same counters, so a test can keep one while the
/// resource owns the other.
#[derive(Debug, Clone)]
pub struct CountingStorage<S> {
    inner: S,
    counts: Arc<Mutex<StorageCounts>>,
}

impl<S: Storage> CountingStorage<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            counts: Arc::new(Mutex::new(StorageCounts::default())),
        }
    }

    pub fn counts(&self) -> StorageCounts {
        *self.counts.lock().unwrap()
    }

    pub fn reset(&self) {
        *self.counts.lock().unwrap() = StorageCounts::default();
    }

    fn bump(&self, f: impl FnOnce(&mut StorageCounts)) {
        f(&mut self.counts.lock().unwrap());
    }
}

impl<S: Storage> Storage for CountingStorage<S> {
    fn exists(&self, location: &str) -> anyhow::Result<bool> {
        self.bump(|c| c.exists += 1);
        self.inner.exists(location)
    }

    fn load(&self, location: &str) -> anyhow::Result<Data> {
        self.bump(|c| c.loads += 1);
        self.inner.load(location)
    }

    fn save(&self, location: &str, data: &Data) -> anyhow::Result<()> {
        self.bump(|c| c.saves += 1);
        self.inner.save(location, data)
    }

    fn delete(&self, location: &str) -> anyhow::Result<()> {
        self.bump(|c| c.deletes += 1);
        self.inner.delete(location)
    }
}
