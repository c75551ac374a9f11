use crate::app_dirs::AppDirs;
use env_logger::{Builder, Env, Target};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

/// Route `log` records into the state-dir log file.
/// The terminal belongs to the TUI, so nothing is written to stderr.
pub fn init() -> io::Result<()> {
    match AppDirs::log_path() {
        Some(path) => init_with_path(&path),
        None => Ok(()),
    }
}

pub fn init_with_path(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    // a second init is a no-op, tests may race on it
    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init();
    log::info!("Logging initialized");
    Ok(())
}
