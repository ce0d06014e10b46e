//ztree/src/main.rs
use std::path::PathBuf;
use std::process::ExitCode;

use ztree::app::{execute, Command, CommandError};
use ztree::kernel::services::adapters::{
    default_project_file, ensure_settings_file, load_settings, JsonFileStore,
};
use ztree::kernel::TreeStore;

mod logging;

fn main() -> ExitCode {
    let logging = logging::init();
    if let Some(guard) = &logging {
        tracing::debug!(log_dir = %guard.log_dir().display(), "ztree starting");
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(args) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!(error = %error, "command failed");
            eprintln!("ztree: {}", error);
            ExitCode::FAILURE
        }
    }
}

/// Splits a leading `--project <file>` off the argument list.
fn take_project_flag(mut args: Vec<String>) -> Result<(Option<PathBuf>, Vec<String>), CommandError> {
    if args.first().map(String::as_str) != Some("--project") {
        return Ok((None, args));
    }
    if args.len() < 2 {
        return Err(CommandError::Usage("--project <file>".to_string()));
    }
    let rest = args.split_off(2);
    Ok((Some(PathBuf::from(&args[1])), rest))
}

fn run(args: Vec<String>) -> Result<String, CommandError> {
    let (project_flag, args) = take_project_flag(args)?;
    let cmd = Command::parse(&args)?;
    if cmd == Command::Help {
        return execute(&mut TreeStore::new(), &cmd);
    }

    if let Err(error) = ensure_settings_file() {
        tracing::warn!(error = %error, "cannot write default settings");
    }
    let config = load_settings().unwrap_or_default();
    let project = project_flag
        .or_else(|| config.project_file.clone())
        .or_else(default_project_file)
        .ok_or_else(|| CommandError::Usage("--project <file> (no data directory)".to_string()))?;
    tracing::info!(project = %project.display(), ?cmd, "running command");

    let backend = JsonFileStore::new(&project).pretty(config.pretty_snapshots);
    let autosave = config.autosave;
    let mut store = TreeStore::with_persistence(config, Box::new(backend));
    if let Some(error) = store.take_persist_error() {
        return Err(error.into());
    }

    let output = execute(&mut store, &cmd)?;

    if cmd.is_mutating() && !autosave {
        store.save_now()?;
    }
    if let Some(error) = store.take_persist_error() {
        return Err(error.into());
    }
    Ok(output)
}
