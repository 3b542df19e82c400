use std::path::Path;
use std::process::Command;
use std::thread;
use tracing::{info, warn};

use super::matching_files;

/// Extensions counted as photos on a client card
pub const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// Result of asking the host to show a folder
#[derive(Debug, Clone, PartialEq)]
pub enum FolderOpen {
    /// The file browser was started; nothing is known beyond that
    Launched,
    Missing,
    Failed(String),
}

/// Number of photos directly inside `folder` (0 if it can't be read)
pub fn count_photos(folder: &Path) -> usize {
    matching_files(folder, PHOTO_EXTENSIONS).count()
}

/// Open `folder` in the platform file browser without waiting for it.
pub fn open_in_file_browser(folder: &Path) -> FolderOpen {
    if !folder.is_dir() {
        warn!(folder = ?folder, "Folder does not exist");
        return FolderOpen::Missing;
    }

    launch(folder, launcher(folder))
}

/// Spawn `cmd` and reap it on a detached thread so it never lingers as a zombie.
fn launch(folder: &Path, mut cmd: Command) -> FolderOpen {
    match cmd.spawn() {
        Ok(mut child) => {
            thread::spawn(move || {
                let _ = child.wait();
            });
            info!(folder = ?folder, "Opened folder");
            FolderOpen::Launched
        }
        Err(e) => {
            warn!(folder = ?folder, error = %e, "Could not open folder");
            FolderOpen::Failed(e.to_string())
        }
    }
}

#[cfg(target_os = "windows")]
fn launcher(folder: &Path) -> Command {
    let mut cmd = Command::new("explorer");
    cmd.arg(folder);
    cmd
}

#[cfg(target_os = "macos")]
fn launcher(folder: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(folder);
    cmd
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn launcher(folder: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(folder);
    cmd
}
