//! Project file tree: an arena of nodes plus the ordered forest of roots.
//!
//! Folders own an ordered list of child ids and every node keeps an optional
//! parent id. The arena is the only owner; all links are id lookups.

use compact_str::CompactString;
use rustc_hash::FxHashSet;
use slotmap::{new_key_type, SlotMap};
use std::fmt;

use super::language::LanguageId;

new_key_type! { pub struct NodeId; }

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    File,
    Folder,
}

/// Characters a node name may never contain.
pub const RESERVED_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileTreeError {
    InvalidName(String),
    NameExists,
    InvalidNodeId,
    ParentNotFolder,
    MoveIntoDescendant,
    NotAFile,
}

impl fmt::Display for FileTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileTreeError::InvalidName(name) => write!(f, "invalid name: {:?}", name),
            FileTreeError::NameExists => write!(f, "name already exists in parent"),
            FileTreeError::InvalidNodeId => write!(f, "invalid node id"),
            FileTreeError::ParentNotFolder => write!(f, "parent is not a folder"),
            FileTreeError::MoveIntoDescendant => {
                write!(f, "cannot move node into its own subtree")
            }
            FileTreeError::NotAFile => write!(f, "node is not a file"),
        }
    }
}

impl std::error::Error for FileTreeError {}

pub fn validate_name(name: &str) -> Result<(), FileTreeError> {
    if name.trim().is_empty() || name.chars().any(|c| RESERVED_CHARS.contains(&c)) {
        return Err(FileTreeError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileData {
    pub content: String,
    /// Empty when unset (only possible for imported nodes).
    pub language: CompactString,
    pub is_open: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    File(FileData),
    Folder(Vec<NodeId>),
}

#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    name: CompactString,
    parent: Option<NodeId>,
    data: NodeData,
    created_at: u64,
    modified_at: u64,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::File(_) => NodeKind::File,
            NodeData::Folder(_) => NodeKind::Folder,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self.data, NodeData::File(_))
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.data, NodeData::Folder(_))
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn file(&self) -> Option<&FileData> {
        match &self.data {
            NodeData::File(file) => Some(file),
            NodeData::Folder(_) => None,
        }
    }

    pub fn content(&self) -> Option<&str> {
        self.file().map(|f| f.content.as_str())
    }

    pub fn language(&self) -> Option<&str> {
        self.file().map(|f| f.language.as_str())
    }

    /// Always false for folders.
    pub fn is_open(&self) -> bool {
        self.file().is_some_and(|f| f.is_open)
    }

    /// Empty for files.
    pub fn children(&self) -> &[NodeId] {
        match &self.data {
            NodeData::Folder(children) => children,
            NodeData::File(_) => &[],
        }
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn modified_at(&self) -> u64 {
        self.modified_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A node was reached twice while walking down from the roots.
    Revisited(NodeId),
    /// A child list names an id the arena does not hold.
    Dangling(NodeId),
    ParentMismatch(NodeId),
    DuplicateName {
        parent: Option<NodeId>,
        name: CompactString,
    },
    Unreachable(NodeId),
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::Revisited(id) => write!(f, "node {:?} reached twice", id),
            InvariantViolation::Dangling(id) => write!(f, "child {:?} does not exist", id),
            InvariantViolation::ParentMismatch(id) => {
                write!(f, "node {:?} has a stale parent link", id)
            }
            InvariantViolation::DuplicateName { parent, name } => {
                write!(f, "duplicate name {:?} under {:?}", name, parent)
            }
            InvariantViolation::Unreachable(id) => {
                write!(f, "node {:?} is not reachable from the roots", id)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FileTree {
    arena: SlotMap<NodeId, Node>,
    roots: Vec<NodeId>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains_key(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// `None` for files and unknown ids.
    pub fn children(&self, id: NodeId) -> Option<&[NodeId]> {
        match &self.arena.get(id)?.data {
            NodeData::Folder(children) => Some(children),
            NodeData::File(_) => None,
        }
    }

    /// Child list of `parent`, or the forest when `parent` is `None`.
    fn siblings(&self, parent: Option<NodeId>) -> Result<&[NodeId], FileTreeError> {
        let Some(parent_id) = parent else {
            return Ok(&self.roots);
        };
        let node = self
            .arena
            .get(parent_id)
            .ok_or(FileTreeError::InvalidNodeId)?;
        match &node.data {
            NodeData::Folder(children) => Ok(children),
            NodeData::File(_) => Err(FileTreeError::ParentNotFolder),
        }
    }

    fn siblings_mut(&mut self, parent: Option<NodeId>) -> Result<&mut Vec<NodeId>, FileTreeError> {
        let Some(parent_id) = parent else {
            return Ok(&mut self.roots);
        };
        let node = self
            .arena
            .get_mut(parent_id)
            .ok_or(FileTreeError::InvalidNodeId)?;
        match &mut node.data {
            NodeData::Folder(children) => Ok(children),
            NodeData::File(_) => Err(FileTreeError::ParentNotFolder),
        }
    }

    /// Whether a sibling other than `exclude` under `parent` is called `name`.
    pub fn name_taken(
        &self,
        parent: Option<NodeId>,
        name: &str,
        exclude: Option<NodeId>,
    ) -> Result<bool, FileTreeError> {
        let siblings = self.siblings(parent)?;
        Ok(siblings.iter().any(|&sibling| {
            Some(sibling) != exclude
                && self
                    .arena
                    .get(sibling)
                    .is_some_and(|n| n.name.as_str() == name)
        }))
    }

    pub fn insert_file(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        content: String,
        language: Option<&str>,
        now: u64,
    ) -> Result<NodeId, FileTreeError> {
        self.check_new_child(parent, name)?;
        let language = match language {
            Some(lang) => CompactString::from(lang),
            None => CompactString::from(LanguageId::from_file_name(name).as_str()),
        };
        let data = NodeData::File(FileData {
            content,
            language,
            is_open: false,
        });
        self.attach(parent, name.into(), data, now, now)
    }

    pub fn insert_folder(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        now: u64,
    ) -> Result<NodeId, FileTreeError> {
        self.check_new_child(parent, name)?;
        self.attach(parent, name.into(), NodeData::Folder(Vec::new()), now, now)
    }

    fn check_new_child(&self, parent: Option<NodeId>, name: &str) -> Result<(), FileTreeError> {
        validate_name(name)?;
        if self.name_taken(parent, name, None)? {
            return Err(FileTreeError::NameExists);
        }
        Ok(())
    }

    /// Appends a node under `parent` without name checks. Folder data must
    /// start with an empty child list.
    pub(crate) fn attach(
        &mut self,
        parent: Option<NodeId>,
        name: CompactString,
        data: NodeData,
        created_at: u64,
        modified_at: u64,
    ) -> Result<NodeId, FileTreeError> {
        self.siblings(parent)?;
        let id = self.arena.insert_with_key(|id| Node {
            id,
            name,
            parent,
            data,
            created_at,
            modified_at,
        });
        self.siblings_mut(parent)?.push(id);
        Ok(id)
    }

    pub fn set_content(&mut self, id: NodeId, content: String, now: u64) -> Result<(), FileTreeError> {
        let node = self.arena.get_mut(id).ok_or(FileTreeError::InvalidNodeId)?;
        match &mut node.data {
            NodeData::File(file) => {
                file.content = content;
                node.modified_at = now;
                Ok(())
            }
            NodeData::Folder(_) => Err(FileTreeError::NotAFile),
        }
    }

    /// Files get their language tag recomputed from the new extension.
    pub fn rename(&mut self, id: NodeId, new_name: &str, now: u64) -> Result<(), FileTreeError> {
        validate_name(new_name)?;
        let parent = self.arena.get(id).ok_or(FileTreeError::InvalidNodeId)?.parent;
        if self.name_taken(parent, new_name, Some(id))? {
            return Err(FileTreeError::NameExists);
        }

        let node = self.arena.get_mut(id).ok_or(FileTreeError::InvalidNodeId)?;
        node.name = new_name.into();
        node.modified_at = now;
        if let NodeData::File(file) = &mut node.data {
            file.language = LanguageId::from_file_name(new_name).as_str().into();
        }
        Ok(())
    }

    /// True when `ancestor` is a strict ancestor of `descendant`.
    pub fn is_ancestor(&self, ancestor: NodeId, mut descendant: NodeId) -> bool {
        while let Some(parent) = self.arena.get(descendant).and_then(|n| n.parent) {
            if parent == ancestor {
                return true;
            }
            descendant = parent;
        }
        false
    }

    /// Moves `id` to the end of `new_parent`'s children, or of the forest.
    /// The destination is fully validated before the node is detached.
    pub fn move_to(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Result<(), FileTreeError> {
        let (name, old_parent) = {
            let node = self.arena.get(id).ok_or(FileTreeError::InvalidNodeId)?;
            (node.name.clone(), node.parent)
        };

        if let Some(target) = new_parent {
            if target == id || self.is_ancestor(id, target) {
                return Err(FileTreeError::MoveIntoDescendant);
            }
        }
        if self.name_taken(new_parent, &name, Some(id))? {
            return Err(FileTreeError::NameExists);
        }

        self.detach(id, old_parent);
        self.siblings_mut(new_parent)?.push(id);
        if let Some(node) = self.arena.get_mut(id) {
            node.parent = new_parent;
        }
        Ok(())
    }

    fn detach(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Ok(siblings) = self.siblings_mut(parent) {
            siblings.retain(|&child| child != id);
        }
    }

    /// Marks every file in the subtree rooted at `id` closed.
    pub fn close_subtree(&mut self, id: NodeId) {
        let ids: Vec<NodeId> = self.subtree(id).map(Node::id).collect();
        for node_id in ids {
            if let Some(NodeData::File(file)) = self.arena.get_mut(node_id).map(|n| &mut n.data) {
                file.is_open = false;
            }
        }
    }

    /// Detaches the subtree rooted at `id` and drops it from the arena.
    /// Returns the removed ids in pre-order.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<Vec<NodeId>, FileTreeError> {
        let parent = self.arena.get(id).ok_or(FileTreeError::InvalidNodeId)?.parent;
        let removed: Vec<NodeId> = self.subtree(id).map(Node::id).collect();
        self.detach(id, parent);
        for node_id in &removed {
            self.arena.remove(*node_id);
        }
        Ok(removed)
    }

    /// Returns the new open state, or `None` for folders and unknown ids.
    pub fn toggle_open(&mut self, id: NodeId) -> Option<bool> {
        match &mut self.arena.get_mut(id)?.data {
            NodeData::File(file) => {
                file.is_open = !file.is_open;
                Some(file.is_open)
            }
            NodeData::Folder(_) => None,
        }
    }

    /// `/`-joined names from the root down to `id`, starting with `/`.
    pub fn path(&self, id: NodeId) -> Option<String> {
        let mut node = self.arena.get(id)?;
        let mut components = vec![node.name.as_str()];
        while let Some(parent) = node.parent.and_then(|p| self.arena.get(p)) {
            components.push(parent.name.as_str());
            node = parent;
        }
        components.reverse();
        Some(format!("/{}", components.join("/")))
    }

    /// Resolves a `/`-separated path. Empty components are skipped, so `/`
    /// itself resolves to nothing.
    pub fn find_node_by_path(&self, path: &str) -> Option<NodeId> {
        let mut siblings: &[NodeId] = &self.roots;
        let mut found = None;
        for component in path.split('/').filter(|c| !c.is_empty()) {
            let id = siblings.iter().copied().find(|&sibling| {
                self.arena
                    .get(sibling)
                    .is_some_and(|n| n.name.as_str() == component)
            })?;
            siblings = self.children(id).unwrap_or(&[]);
            found = Some(id);
        }
        found
    }

    /// Pre-order walk over the whole forest, children in insertion order.
    pub fn iter_depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            tree: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }

    /// Pre-order walk over the subtree rooted at `id` (inclusive).
    pub fn subtree(&self, id: NodeId) -> DepthFirst<'_> {
        DepthFirst {
            tree: self,
            stack: vec![id],
        }
    }

    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut visited = FxHashSet::default();
        self.check_sibling_names(None, &self.roots)?;
        let mut stack: Vec<(NodeId, Option<NodeId>)> =
            self.roots.iter().rev().map(|&id| (id, None)).collect();

        while let Some((id, expected_parent)) = stack.pop() {
            if !visited.insert(id) {
                return Err(InvariantViolation::Revisited(id));
            }
            let node = self.arena.get(id).ok_or(InvariantViolation::Dangling(id))?;
            if node.parent != expected_parent {
                return Err(InvariantViolation::ParentMismatch(id));
            }
            if let NodeData::Folder(children) = &node.data {
                self.check_sibling_names(Some(id), children)?;
                stack.extend(children.iter().rev().map(|&child| (child, Some(id))));
            }
        }

        match self.arena.keys().find(|id| !visited.contains(id)) {
            Some(id) => Err(InvariantViolation::Unreachable(id)),
            None => Ok(()),
        }
    }

    fn check_sibling_names(
        &self,
        parent: Option<NodeId>,
        children: &[NodeId],
    ) -> Result<(), InvariantViolation> {
        let mut seen = FxHashSet::default();
        for node in children.iter().filter_map(|&child| self.arena.get(child)) {
            if !seen.insert(node.name.as_str()) {
                return Err(InvariantViolation::DuplicateName {
                    parent,
                    name: node.name.clone(),
                });
            }
        }
        Ok(())
    }
}

pub struct DepthFirst<'a> {
    tree: &'a FileTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let tree = self.tree;
        while let Some(id) = self.stack.pop() {
            if let Some(node) = tree.arena.get(id) {
                if let NodeData::Folder(children) = &node.data {
                    self.stack.extend(children.iter().rev().copied());
                }
                return Some(node);
            }
        }
        None
    }
}

#[derive(Debug, Clone)]
pub struct FileTreeRow {
    pub id: NodeId,
    pub depth: u16,
    pub name: CompactString,
    pub kind: NodeKind,
    pub is_open: bool,
}

impl FileTree {
    /// Flattens the forest into display rows, in insertion order.
    pub fn flatten_for_view(&self) -> Vec<FileTreeRow> {
        let mut result = Vec::with_capacity(self.arena.len());
        let mut stack: Vec<(NodeId, u16)> = self.roots.iter().rev().map(|&id| (id, 0)).collect();

        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.arena.get(id) else {
                continue;
            };
            result.push(FileTreeRow {
                id,
                depth,
                name: node.name.clone(),
                kind: node.kind(),
                is_open: node.is_open(),
            });
            for &child in node.children().iter().rev() {
                stack.push((child, depth.saturating_add(1)));
            }
        }

        result
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/file_tree.rs"]
mod tests;
