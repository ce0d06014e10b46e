//! ztree - in-memory project file tree
//!
//! Module layout:
//! - models: arena-backed file tree, language table, statistics
//! - kernel: TreeStore, change events, snapshots, templates, services (ports + adapters)
//! - app: headless command front end used by the `ztree` binary

pub mod app;
pub mod kernel;
pub mod models;
