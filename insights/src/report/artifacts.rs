use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// A `report-{uuid}` directory owned by one report request. Dropping the guard
/// removes the directory and everything in it unless `keep` was set, so charts
/// are cleaned up on success, on error and when the request future is dropped.
#[derive(Debug)]
pub struct RequestArtifacts {
    dir: PathBuf,
    keep: bool,
}

impl RequestArtifacts {
    pub fn create(root: &Path, keep: bool) -> io::Result<Self> {
        let dir = root.join(format!("report-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, keep })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Drop for RequestArtifacts {
    fn drop(&mut self) {
        if self.keep {
            tracing::debug!(dir = %self.dir.display(), "keeping chart directory");
            return;
        }
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(dir = %self.dir.display(), error = %err, "chart cleanup failed");
            }
        }
    }
}
