//! Snapshot document: the nested forest plus statistics and an export stamp.
//!
//! This is the only structure that leaves the process (export, persistence).
//! Field names are camelCase; key order is not significant.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use slotmap::Key;
use std::fmt;

use crate::models::{FileData, FileTree, NodeData, NodeId, TreeStats};

#[derive(Debug)]
pub enum SnapshotError {
    Parse(serde_json::Error),
    Serialize(serde_json::Error),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Parse(e) => write!(f, "malformed snapshot: {}", e),
            SnapshotError::Serialize(e) => write!(f, "cannot serialize snapshot: {}", e),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Parse(e) | SnapshotError::Serialize(e) => Some(e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotKind {
    File,
    Folder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotNode {
    /// Informational only; ids are reassigned on import.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: CompactString,
    #[serde(rename = "type")]
    pub kind: SnapshotKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<CompactString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<SnapshotNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_open: Option<bool>,
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub modified_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub root: Vec<SnapshotNode>,
    #[serde(default)]
    pub stats: TreeStats,
    #[serde(default)]
    pub exported_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_path: Option<String>,
}

pub fn format_node_id(id: NodeId) -> String {
    format!("node-{:x}", id.data().as_ffi())
}

impl Snapshot {
    pub fn capture(tree: &FileTree, current: Option<NodeId>, exported_at: u64) -> Self {
        Self {
            root: tree
                .roots()
                .iter()
                .filter_map(|&id| SnapshotNode::capture(tree, id))
                .collect(),
            stats: TreeStats::collect(tree),
            exported_at,
            current_path: current.and_then(|id| tree.path(id)),
        }
    }

    /// Builds a fresh tree with newly allocated ids. Names and structure are
    /// taken as given; no uniqueness checks are applied.
    pub fn into_tree(self) -> (FileTree, Option<NodeId>) {
        let mut tree = FileTree::new();
        for node in self.root {
            node.attach_to(&mut tree, None);
        }
        let current = self
            .current_path
            .as_deref()
            .and_then(|path| tree.find_node_by_path(path));
        (tree, current)
    }

    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(text).map_err(SnapshotError::Parse)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, SnapshotError> {
        let result = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        result.map_err(SnapshotError::Serialize)
    }
}

impl SnapshotNode {
    fn capture(tree: &FileTree, id: NodeId) -> Option<Self> {
        let node = tree.get(id)?;
        let mut out = Self {
            id: Some(format_node_id(id)),
            name: node.name().into(),
            kind: SnapshotKind::Folder,
            content: None,
            language: None,
            children: None,
            is_open: None,
            created_at: node.created_at(),
            modified_at: node.modified_at(),
        };
        match node.data() {
            NodeData::File(file) => {
                out.kind = SnapshotKind::File;
                out.content = Some(file.content.clone());
                out.language = (!file.language.is_empty()).then(|| file.language.clone());
                out.is_open = Some(file.is_open);
            }
            NodeData::Folder(children) => {
                out.children = Some(
                    children
                        .iter()
                        .filter_map(|&child| Self::capture(tree, child))
                        .collect(),
                );
            }
        }
        Some(out)
    }

    fn attach_to(self, tree: &mut FileTree, parent: Option<NodeId>) {
        let SnapshotNode {
            name,
            kind,
            content,
            language,
            children,
            is_open,
            created_at,
            modified_at,
            ..
        } = self;

        let data = match kind {
            SnapshotKind::File => NodeData::File(FileData {
                content: content.unwrap_or_default(),
                language: language.unwrap_or_default(),
                is_open: is_open.unwrap_or(false),
            }),
            SnapshotKind::Folder => NodeData::Folder(Vec::new()),
        };
        let Ok(id) = tree.attach(parent, name, data, created_at, modified_at) else {
            return;
        };
        if kind == SnapshotKind::Folder {
            for child in children.unwrap_or_default() {
                child.attach_to(tree, Some(id));
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/snapshot.rs"]
mod tests;
