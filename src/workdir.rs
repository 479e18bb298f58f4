//! Scoped change of the process working directory.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// Changes the working directory on creation and restores the previous one on drop.
///
/// The working directory is process-wide; only one guard should be live at a time.
#[must_use = "the previous directory is restored as soon as the guard is dropped"]
#[derive(Debug)]
pub struct WorkingDirGuard {
    previous: PathBuf,
}

impl WorkingDirGuard {
    pub fn enter(dir: &Path) -> io::Result<Self> {
        let previous = env::current_dir()?;
        env::set_current_dir(dir)?;
        log::debug!("entered {}", dir.display());
        Ok(Self { previous })
    }

    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(err) = env::set_current_dir(&self.previous) {
            log::error!(
                "could not restore working directory {}: {}",
                self.previous.display(),
                err
            );
        }
    }
}
