//! Service adapters: OS specific implementations (disk, data directories).

pub mod paths;
pub mod persistence;
pub mod settings;

pub use paths::{default_project_file, ensure_log_dir, get_log_dir, get_projects_dir};
pub use persistence::{JsonFileStore, MemoryStore};
pub use settings::{
    ensure_settings_file, get_settings_path, load_settings, load_settings_from,
    write_default_settings,
};
