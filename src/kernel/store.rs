//! Tree store: the single authority over the project forest.
//!
//! Every structural or content mutation goes through [`TreeStore`]. After a
//! mutation has been fully applied the store notifies observers and, when
//! `autosave` is on, hands a snapshot to the persistence port.
//!
//! Persistence is fire-and-forget from the caller's point of view: a failed
//! save is logged and kept in [`TreeStore::last_persist_error`], and the
//! mutation that triggered it still succeeds. After a failed load, autosave
//! stays off until [`TreeStore::save_now`] or an import succeeds, so the
//! unreadable document is never overwritten implicitly.

use std::sync::mpsc::Receiver;

use crate::kernel::events::{ChangeNotifier, StoreEvent, SubscriptionId};
use crate::kernel::services::ports::{
    Clock, PersistenceError, SnapshotStore, SystemClock, TreeConfig,
};
use crate::kernel::snapshot::{Snapshot, SnapshotError};
use crate::kernel::template::TemplateKind;
use crate::models::{
    DepthFirst, FileTree, FileTreeError, FileTreeRow, Node, NodeId, NodeKind, TreeStats,
};

pub struct TreeStore {
    tree: FileTree,
    current: Option<NodeId>,
    notifier: ChangeNotifier,
    clock: Box<dyn Clock>,
    persistence: Option<Box<dyn SnapshotStore>>,
    config: TreeConfig,
    persist_error: Option<PersistenceError>,
    /// Set when the initial load failed; blocks autosave.
    load_failed: bool,
}

fn rejected(op: &'static str, error: FileTreeError) -> FileTreeError {
    tracing::debug!(op, error = %error, "tree operation rejected");
    error
}

impl TreeStore {
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            tree: FileTree::new(),
            current: None,
            notifier: ChangeNotifier::new(),
            clock: Box::new(SystemClock),
            persistence: None,
            config,
            persist_error: None,
            load_failed: false,
        }
    }

    /// Builds a store backed by `persistence` and loads whatever it holds.
    /// A failed load leaves the store empty, is kept as the last persistence
    /// error, and suspends autosave.
    pub fn with_persistence(config: TreeConfig, persistence: Box<dyn SnapshotStore>) -> Self {
        let mut store = Self::with_config(config);
        match persistence.load() {
            Ok(Some(snapshot)) => {
                store.replace_from(snapshot);
                tracing::info!(
                    backend = persistence.name(),
                    nodes = store.tree.len(),
                    "loaded project snapshot"
                );
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(backend = persistence.name(), error = %error, "load snapshot failed");
                store.persist_error = Some(error);
                store.load_failed = true;
            }
        }
        store.persistence = Some(persistence);
        store
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    // ---- lookup ----

    pub fn find_by_id(&self, id: NodeId) -> Option<&Node> {
        self.tree.get(id)
    }

    pub fn find_by_path(&self, path: &str) -> Option<&Node> {
        self.tree
            .find_node_by_path(path)
            .and_then(|id| self.tree.get(id))
    }

    pub fn get_path(&self, id: NodeId) -> Option<String> {
        self.tree.path(id)
    }

    // ---- create ----

    pub fn create_file(
        &mut self,
        name: &str,
        parent: Option<NodeId>,
        content: impl Into<String>,
        language: Option<&str>,
    ) -> Result<NodeId, FileTreeError> {
        let now = self.clock.now_ms();
        let id = self
            .tree
            .insert_file(parent, name, content.into(), language, now)
            .map_err(|e| rejected("create_file", e))?;
        self.commit(StoreEvent::Created {
            id,
            kind: NodeKind::File,
        });
        Ok(id)
    }

    pub fn create_folder(&mut self, name: &str, parent: Option<NodeId>) -> Result<NodeId, FileTreeError> {
        let now = self.clock.now_ms();
        let id = self
            .tree
            .insert_folder(parent, name, now)
            .map_err(|e| rejected("create_folder", e))?;
        self.commit(StoreEvent::Created {
            id,
            kind: NodeKind::Folder,
        });
        Ok(id)
    }

    /// Instantiates a canned template as `<name>.<ext>` under `parent`.
    /// Goes through the same checks as [`TreeStore::create_file`].
    pub fn create_from_template(
        &mut self,
        kind: TemplateKind,
        name: &str,
        parent: Option<NodeId>,
    ) -> Result<NodeId, FileTreeError> {
        let (file_name, content) = kind.render(name);
        self.create_file(&file_name, parent, content, None)
    }

    // ---- read ----

    /// `None` for folders and unknown ids.
    pub fn get_content(&self, id: NodeId) -> Option<&str> {
        self.tree.get(id)?.content()
    }

    pub fn list_roots(&self) -> Vec<&Node> {
        self.tree
            .roots()
            .iter()
            .filter_map(|&id| self.tree.get(id))
            .collect()
    }

    pub fn children(&self, id: NodeId) -> Vec<&Node> {
        self.tree
            .children(id)
            .unwrap_or(&[])
            .iter()
            .filter_map(|&child| self.tree.get(child))
            .collect()
    }

    pub fn get_current(&self) -> Option<&Node> {
        self.current.and_then(|id| self.tree.get(id))
    }

    pub fn iter_depth_first(&self) -> DepthFirst<'_> {
        self.tree.iter_depth_first()
    }

    pub fn rows(&self) -> Vec<FileTreeRow> {
        self.tree.flatten_for_view()
    }

    // ---- update ----

    pub fn set_content(&mut self, id: NodeId, content: impl Into<String>) -> Result<(), FileTreeError> {
        let now = self.clock.now_ms();
        self.tree
            .set_content(id, content.into(), now)
            .map_err(|e| rejected("set_content", e))?;
        self.commit(StoreEvent::ContentChanged { id });
        Ok(())
    }

    pub fn rename(&mut self, id: NodeId, new_name: &str) -> Result<(), FileTreeError> {
        let now = self.clock.now_ms();
        self.tree
            .rename(id, new_name, now)
            .map_err(|e| rejected("rename", e))?;
        self.commit(StoreEvent::Renamed { id });
        Ok(())
    }

    /// Moves `id` under `new_parent`, or to the forest root when `None`.
    /// Fails without touching the tree if the destination is missing, is
    /// not a folder, lies inside `id`'s subtree, or already holds the name.
    pub fn move_node(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Result<(), FileTreeError> {
        let from = self.tree.get(id).and_then(Node::parent);
        self.tree
            .move_to(id, new_parent)
            .map_err(|e| rejected("move_node", e))?;
        self.commit(StoreEvent::Moved {
            id,
            from,
            to: new_parent,
        });
        Ok(())
    }

    pub fn set_current(&mut self, id: Option<NodeId>) {
        self.current = id;
        self.commit(StoreEvent::CurrentChanged { current: id });
    }

    /// Returns the new open state; `None` (and no notification) for folders
    /// and unknown ids.
    pub fn toggle_open(&mut self, id: NodeId) -> Option<bool> {
        let is_open = self.tree.toggle_open(id)?;
        self.commit(StoreEvent::OpenToggled { id, is_open });
        Some(is_open)
    }

    // ---- delete ----

    pub fn delete_by_id(&mut self, id: NodeId) -> Result<(), FileTreeError> {
        if !self.tree.contains(id) {
            return Err(rejected("delete_by_id", FileTreeError::InvalidNodeId));
        }
        if let Some(current) = self.current {
            if current == id || self.tree.is_ancestor(id, current) {
                self.current = None;
            }
        }
        self.tree.close_subtree(id);
        let removed = self.tree.remove_subtree(id)?;
        self.commit(StoreEvent::Deleted {
            id,
            removed: removed.len(),
        });
        Ok(())
    }

    // ---- query / aggregate ----

    /// Case-insensitive substring match over names, in pre-order.
    pub fn search(&self, query: &str) -> Vec<&Node> {
        let needle = query.to_lowercase();
        self.tree
            .iter_depth_first()
            .filter(|node| node.name().to_lowercase().contains(&needle))
            .collect()
    }

    /// Files whose name ends with `.<ext>` (case-sensitive), in pre-order.
    pub fn find_by_extension(&self, ext: &str) -> Vec<&Node> {
        let suffix = format!(".{}", ext);
        self.tree
            .iter_depth_first()
            .filter(|node| node.is_file() && node.name().ends_with(&suffix))
            .collect()
    }

    pub fn list_open_files(&self) -> Vec<&Node> {
        self.tree
            .iter_depth_first()
            .filter(|node| node.is_open())
            .collect()
    }

    pub fn compute_stats(&self) -> TreeStats {
        TreeStats::collect(&self.tree)
    }

    // ---- change notification ----

    pub fn subscribe(&mut self, callback: impl FnMut() + 'static) -> SubscriptionId {
        self.notifier.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Receiver for typed change events, one per successful mutation.
    pub fn event_channel(&mut self) -> Receiver<StoreEvent> {
        self.notifier.channel()
    }

    // ---- serialization ----

    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.tree, self.current, self.clock.now_ms())
    }

    pub fn export_json(&self, pretty: bool) -> Result<String, SnapshotError> {
        self.export_snapshot().to_json(pretty)
    }

    /// Replaces the whole forest. Node ids are reassigned; the current
    /// selection is restored from the snapshot's `currentPath` if present.
    pub fn import_snapshot(&mut self, snapshot: Snapshot) {
        self.replace_from(snapshot);
        self.load_failed = false;
        let roots = self.tree.roots().len();
        self.commit(StoreEvent::Imported { roots });
    }

    /// Parses before touching anything; on error the store is unchanged.
    pub fn import_json(&mut self, text: &str) -> Result<(), SnapshotError> {
        let snapshot = Snapshot::from_json(text).inspect_err(|error| {
            tracing::debug!(error = %error, "snapshot import rejected");
        })?;
        self.import_snapshot(snapshot);
        Ok(())
    }

    fn replace_from(&mut self, snapshot: Snapshot) {
        let (tree, current) = snapshot.into_tree();
        if let Err(violation) = tree.check_invariants() {
            tracing::warn!(%violation, "imported tree is not well formed");
        }
        self.tree = tree;
        self.current = current;
    }

    // ---- persistence ----

    /// Saves immediately and reports the outcome, regardless of `autosave`.
    /// A successful save re-enables autosave after a failed load.
    pub fn save_now(&mut self) -> Result<(), PersistenceError> {
        let Some(backend) = self.persistence.as_ref() else {
            return Ok(());
        };
        backend.save(&self.export_snapshot())?;
        self.load_failed = false;
        Ok(())
    }

    pub fn last_persist_error(&self) -> Option<&PersistenceError> {
        self.persist_error.as_ref()
    }

    pub fn take_persist_error(&mut self) -> Option<PersistenceError> {
        self.persist_error.take()
    }

    fn commit(&mut self, event: StoreEvent) {
        tracing::debug!(?event, "tree changed");
        self.notifier.emit(&event);
        if self.config.autosave {
            self.persist();
        }
    }

    fn persist(&mut self) {
        let Some(backend) = self.persistence.as_ref() else {
            return;
        };
        if self.load_failed {
            tracing::debug!(backend = backend.name(), "autosave suspended after failed load");
            return;
        }
        if let Err(error) = backend.save(&self.export_snapshot()) {
            tracing::warn!(backend = backend.name(), error = %error, "save snapshot failed");
            self.persist_error = Some(error);
        }
    }
}

impl Default for TreeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/store.rs"]
mod tests;
