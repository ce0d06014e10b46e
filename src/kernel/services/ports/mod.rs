//! Service ports: traits + data contracts.

pub mod clock;
pub mod config;
pub mod persistence;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::TreeConfig;
pub use persistence::{PersistenceError, SnapshotStore};
