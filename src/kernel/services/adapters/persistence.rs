//! Snapshot persistence adapters.

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::kernel::services::ports::{PersistenceError, SnapshotStore};
use crate::kernel::snapshot::Snapshot;

/// Stores the snapshot as a JSON document on disk. Writes go to a sibling
/// temp file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    pretty: bool,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: true,
        }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonFileStore {
    fn name(&self) -> &'static str {
        "json-file"
    }

    fn load(&self) -> Result<Option<Snapshot>, PersistenceError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path)?;
        Ok(Some(Snapshot::from_json(&data)?))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let data = snapshot.to_json(self.pretty)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.temp_path();
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Keeps the last saved snapshot in memory. Clones share the same slot, so a
/// caller can hand one clone to the store and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Rc<RefCell<Option<Snapshot>>>,
    saves: Rc<Cell<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        let store = Self::new();
        *store.slot.borrow_mut() = Some(snapshot);
        store
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.slot.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl SnapshotStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn load(&self) -> Result<Option<Snapshot>, PersistenceError> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        *self.slot.borrow_mut() = Some(snapshot.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/persistence.rs"]
mod tests;
