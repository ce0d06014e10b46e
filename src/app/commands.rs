//! Command line verbs and their execution against a store.
//!
//! Nodes are addressed by `/`-separated paths; `/` alone means the forest
//! root.

use std::fmt::{self, Write as _};
use std::io;
use std::path::PathBuf;

use crate::kernel::services::ports::PersistenceError;
use crate::kernel::{SnapshotError, TemplateKind, TreeStore, UnknownTemplate};
use crate::models::{FileTreeError, Node, NodeId, NodeKind};

pub const USAGE: &str = "\
usage: ztree [--project <file>] <command> [args]

commands:
  tree                            print the project tree
  stats                           print file/folder counts and languages
  search <query>                  case-insensitive name search
  ext <extension>                 files with the given extension
  open-files                      files currently marked open
  mkdir <path>                    create a folder
  touch <path>                    create an empty file
  write <path> <text>             replace a file's content
  cat <path>                      print a file's content
  mv <path> <folder|/>            move a node
  rename <path> <new-name>        rename a node
  rm <path>                       delete a node and everything below it
  open <path>                     toggle a file's open flag
  select <path|->                 set or clear the current file
  template <kind> <name> [folder] create a file from a template
  export [file]                   write the snapshot (stdout by default)
  import <file>                   replace the project with a snapshot
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Tree,
    Stats,
    Search(String),
    Ext(String),
    OpenFiles,
    Mkdir(String),
    Touch(String),
    Write { path: String, text: String },
    Cat(String),
    Mv { path: String, dest: String },
    Rename { path: String, name: String },
    Rm(String),
    Open(String),
    Select(Option<String>),
    Template {
        kind: TemplateKind,
        name: String,
        folder: Option<String>,
    },
    Export(Option<PathBuf>),
    Import(PathBuf),
}

#[derive(Debug)]
pub enum CommandError {
    Usage(String),
    UnknownCommand(String),
    NotFound(String),
    Tree(FileTreeError),
    Snapshot(SnapshotError),
    Template(UnknownTemplate),
    Persistence(PersistenceError),
    Io(io::Error),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Usage(msg) => write!(f, "usage: {}", msg),
            CommandError::UnknownCommand(cmd) => write!(f, "unknown command: {}", cmd),
            CommandError::NotFound(path) => write!(f, "no such node: {}", path),
            CommandError::Tree(e) => write!(f, "{}", e),
            CommandError::Snapshot(e) => write!(f, "{}", e),
            CommandError::Template(e) => write!(f, "{}", e),
            CommandError::Persistence(e) => write!(f, "persistence: {}", e),
            CommandError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<FileTreeError> for CommandError {
    fn from(e: FileTreeError) -> Self {
        CommandError::Tree(e)
    }
}

impl From<SnapshotError> for CommandError {
    fn from(e: SnapshotError) -> Self {
        CommandError::Snapshot(e)
    }
}

impl From<UnknownTemplate> for CommandError {
    fn from(e: UnknownTemplate) -> Self {
        CommandError::Template(e)
    }
}

impl From<PersistenceError> for CommandError {
    fn from(e: PersistenceError) -> Self {
        CommandError::Persistence(e)
    }
}

impl From<io::Error> for CommandError {
    fn from(e: io::Error) -> Self {
        CommandError::Io(e)
    }
}

fn arg(args: &[String], index: usize, usage: &str) -> Result<String, CommandError> {
    args.get(index)
        .cloned()
        .ok_or_else(|| CommandError::Usage(usage.to_string()))
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self, CommandError> {
        let Some(verb) = args.first() else {
            return Ok(Command::Help);
        };
        let cmd = match verb.as_str() {
            "help" | "-h" | "--help" => Command::Help,
            "tree" => Command::Tree,
            "stats" => Command::Stats,
            "search" => Command::Search(arg(args, 1, "search <query>")?),
            "ext" => Command::Ext(arg(args, 1, "ext <extension>")?),
            "open-files" => Command::OpenFiles,
            "mkdir" => Command::Mkdir(arg(args, 1, "mkdir <path>")?),
            "touch" => Command::Touch(arg(args, 1, "touch <path>")?),
            "write" => Command::Write {
                path: arg(args, 1, "write <path> <text>")?,
                text: arg(args, 2, "write <path> <text>")?,
            },
            "cat" => Command::Cat(arg(args, 1, "cat <path>")?),
            "mv" => Command::Mv {
                path: arg(args, 1, "mv <path> <folder|/>")?,
                dest: arg(args, 2, "mv <path> <folder|/>")?,
            },
            "rename" => Command::Rename {
                path: arg(args, 1, "rename <path> <new-name>")?,
                name: arg(args, 2, "rename <path> <new-name>")?,
            },
            "rm" => Command::Rm(arg(args, 1, "rm <path>")?),
            "open" => Command::Open(arg(args, 1, "open <path>")?),
            "select" => {
                let target = arg(args, 1, "select <path|->")?;
                Command::Select((target != "-").then_some(target))
            }
            "template" => Command::Template {
                kind: arg(args, 1, "template <kind> <name> [folder]")?.parse()?,
                name: arg(args, 2, "template <kind> <name> [folder]")?,
                folder: args.get(3).cloned(),
            },
            "export" => Command::Export(args.get(1).map(PathBuf::from)),
            "import" => Command::Import(PathBuf::from(arg(args, 1, "import <file>")?)),
            other => return Err(CommandError::UnknownCommand(other.to_string())),
        };
        Ok(cmd)
    }

    /// Whether running the command can change the tree.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Command::Mkdir(_)
                | Command::Touch(_)
                | Command::Write { .. }
                | Command::Mv { .. }
                | Command::Rename { .. }
                | Command::Rm(_)
                | Command::Open(_)
                | Command::Select(_)
                | Command::Template { .. }
                | Command::Import(_)
        )
    }
}

fn resolve(store: &TreeStore, path: &str) -> Result<NodeId, CommandError> {
    store
        .find_by_path(path)
        .map(Node::id)
        .ok_or_else(|| CommandError::NotFound(path.to_string()))
}

/// `/` (or an empty string) is the forest root.
fn resolve_folder(store: &TreeStore, path: &str) -> Result<Option<NodeId>, CommandError> {
    if path.trim_matches('/').is_empty() {
        return Ok(None);
    }
    resolve(store, path).map(Some)
}

/// Splits `path` into its parent folder and final name.
fn resolve_parent<'a>(
    store: &TreeStore,
    path: &'a str,
) -> Result<(Option<NodeId>, &'a str), CommandError> {
    let trimmed = path.trim_end_matches('/');
    let (dir, name) = trimmed.rsplit_once('/').unwrap_or(("", trimmed));
    Ok((resolve_folder(store, dir)?, name))
}

fn path_lines(store: &TreeStore, nodes: &[&Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        if let Some(path) = store.get_path(node.id()) {
            let _ = writeln!(out, "{}", path);
        }
    }
    out
}

fn render_tree(store: &TreeStore) -> String {
    let mut out = String::new();
    for row in store.rows() {
        let indent = "  ".repeat(row.depth as usize);
        let suffix = match row.kind {
            NodeKind::Folder => "/",
            NodeKind::File if row.is_open => " *",
            NodeKind::File => "",
        };
        let _ = writeln!(out, "{}{}{}", indent, row.name, suffix);
    }
    out
}

fn render_stats(store: &TreeStore) -> String {
    let stats = store.compute_stats();
    let mut out = String::new();
    let _ = writeln!(out, "files:   {}", stats.file_count);
    let _ = writeln!(out, "folders: {}", stats.folder_count);
    let _ = writeln!(out, "chars:   {}", stats.total_content_length);
    for (language, count) in &stats.counts_by_language {
        let _ = writeln!(out, "  {:<12} {}", language, count);
    }
    out
}

/// Runs `cmd` and returns what should be printed.
pub fn execute(store: &mut TreeStore, cmd: &Command) -> Result<String, CommandError> {
    let output = match cmd {
        Command::Help => USAGE.to_string(),
        Command::Tree => render_tree(store),
        Command::Stats => render_stats(store),
        Command::Search(query) => path_lines(store, &store.search(query)),
        Command::Ext(ext) => path_lines(store, &store.find_by_extension(ext)),
        Command::OpenFiles => path_lines(store, &store.list_open_files()),
        Command::Mkdir(path) => {
            let (parent, name) = resolve_parent(store, path)?;
            let id = store.create_folder(name, parent)?;
            format!("created {}\n", store.get_path(id).unwrap_or_default())
        }
        Command::Touch(path) => {
            let (parent, name) = resolve_parent(store, path)?;
            let id = store.create_file(name, parent, "", None)?;
            format!("created {}\n", store.get_path(id).unwrap_or_default())
        }
        Command::Write { path, text } => {
            let id = resolve(store, path)?;
            store.set_content(id, text.as_str())?;
            String::new()
        }
        Command::Cat(path) => {
            let id = resolve(store, path)?;
            let content = store
                .get_content(id)
                .ok_or(CommandError::Tree(FileTreeError::NotAFile))?;
            let mut out = content.to_string();
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out
        }
        Command::Mv { path, dest } => {
            let id = resolve(store, path)?;
            let parent = resolve_folder(store, dest)?;
            store.move_node(id, parent)?;
            format!("moved to {}\n", store.get_path(id).unwrap_or_default())
        }
        Command::Rename { path, name } => {
            let id = resolve(store, path)?;
            store.rename(id, name)?;
            format!("renamed to {}\n", store.get_path(id).unwrap_or_default())
        }
        Command::Rm(path) => {
            let id = resolve(store, path)?;
            store.delete_by_id(id)?;
            format!("deleted {}\n", path)
        }
        Command::Open(path) => {
            let id = resolve(store, path)?;
            let is_open = store
                .toggle_open(id)
                .ok_or(CommandError::Tree(FileTreeError::NotAFile))?;
            format!("{} {}\n", if is_open { "opened" } else { "closed" }, path)
        }
        Command::Select(target) => {
            let id = target
                .as_deref()
                .map(|path| resolve(store, path))
                .transpose()?;
            store.set_current(id);
            String::new()
        }
        Command::Template { kind, name, folder } => {
            let parent = match folder {
                Some(folder) => resolve_folder(store, folder)?,
                None => None,
            };
            let id = store.create_from_template(*kind, name, parent)?;
            format!("created {}\n", store.get_path(id).unwrap_or_default())
        }
        Command::Export(target) => {
            let json = store.export_json(store.config().pretty_snapshots)?;
            match target {
                Some(path) => {
                    std::fs::write(path, json)?;
                    format!("exported to {}\n", path.display())
                }
                None => format!("{}\n", json),
            }
        }
        Command::Import(path) => {
            let text = std::fs::read_to_string(path)?;
            store.import_json(&text)?;
            format!("imported {} nodes\n", store.len())
        }
    };
    Ok(output)
}

#[cfg(test)]
#[path = "../../tests/unit/app/commands.rs"]
mod tests;
