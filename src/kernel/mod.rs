//! Headless tree core (store/events/snapshot).

pub mod events;
pub mod services;
pub mod snapshot;
pub mod store;
pub mod template;

pub use events::{ChangeNotifier, StoreEvent, SubscriptionId};
pub use snapshot::{Snapshot, SnapshotError, SnapshotKind, SnapshotNode};
pub use store::TreeStore;
pub use template::{TemplateKind, UnknownTemplate};
