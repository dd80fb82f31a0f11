//! Temporary file guard

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::Result;

/// A temporary file that is removed when the guard goes out of scope
#[derive(Debug)]
pub struct TempResource {
    path: PathBuf,
    armed: bool,
}

impl TempResource {
    /// Take ownership of `path`; nothing is created on disk
    pub fn new(path: PathBuf) -> Self {
        debug!("Tracking temporary file {}", path.display());
        Self { path, armed: true }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file now and report any failure
    pub fn remove(mut self) -> Result<()> {
        self.armed = false;
        remove_if_exists(&self.path)
    }
}

impl Drop for TempResource {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = remove_if_exists(&self.path) {
                warn!(
                    "Failed to remove temporary file {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed temporary file {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_removed_on_drop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scratch.wav");
        std::fs::write(&path, b"data").unwrap();

        {
            let _guard = TempResource::new(path.clone());
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_explicit_remove() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scratch.wav");
        std::fs::write(&path, b"data").unwrap();

        let guard = TempResource::new(path.clone());
        assert_eq!(guard.path(), path.as_path());
        guard.remove().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_file_is_fine() {
        let dir = tempdir().unwrap();
        let guard = TempResource::new(dir.path().join("never-created.wav"));
        assert!(guard.remove().is_ok());
    }
}
