//! Data model layer

pub mod file_tree;
pub mod language;
pub mod stats;

pub use file_tree::{
    validate_name, DepthFirst, FileData, FileTree, FileTreeError, FileTreeRow, InvariantViolation,
    Node, NodeData, NodeId, NodeKind, RESERVED_CHARS,
};
pub use language::LanguageId;
pub use stats::{TreeStats, UNKNOWN_LANGUAGE};
