//! Aggregate statistics over a file tree.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::file_tree::{FileTree, NodeData};

/// Language key used for files whose tag is unset.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeStats {
    pub file_count: usize,
    pub folder_count: usize,
    /// Sum of file content lengths, in chars.
    pub total_content_length: usize,
    pub counts_by_language: BTreeMap<String, usize>,
}

impl TreeStats {
    /// Single pre-order pass over the forest.
    pub fn collect(tree: &FileTree) -> Self {
        let mut stats = Self::default();
        for node in tree.iter_depth_first() {
            match node.data() {
                NodeData::File(file) => {
                    stats.file_count += 1;
                    stats.total_content_length += file.content.chars().count();
                    let language = if file.language.is_empty() {
                        UNKNOWN_LANGUAGE
                    } else {
                        file.language.as_str()
                    };
                    *stats
                        .counts_by_language
                        .entry(language.to_string())
                        .or_insert(0) += 1;
                }
                NodeData::Folder(_) => stats.folder_count += 1,
            }
        }
        stats
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/stats.rs"]
mod tests;
