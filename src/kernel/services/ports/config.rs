use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Save a snapshot through the persistence port after every mutation.
    #[serde(default = "default_true")]
    pub autosave: bool,
    #[serde(default = "default_true")]
    pub pretty_snapshots: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            autosave: true,
            pretty_snapshots: true,
            project_file: None,
        }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/config.rs"]
mod tests;
