//! Persistence port: best-effort storage of the serialized snapshot.

use std::fmt;
use std::io;

use crate::kernel::snapshot::{Snapshot, SnapshotError};

#[derive(Debug)]
pub enum PersistenceError {
    Io(io::Error),
    Snapshot(SnapshotError),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Io(e) => write!(f, "IO error: {}", e),
            PersistenceError::Snapshot(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistenceError::Io(e) => Some(e),
            PersistenceError::Snapshot(e) => Some(e),
        }
    }
}

impl From<io::Error> for PersistenceError {
    fn from(e: io::Error) -> Self {
        PersistenceError::Io(e)
    }
}

impl From<SnapshotError> for PersistenceError {
    fn from(e: SnapshotError) -> Self {
        PersistenceError::Snapshot(e)
    }
}

pub trait SnapshotStore {
    fn name(&self) -> &'static str;

    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Snapshot>, PersistenceError>;

    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError>;
}
