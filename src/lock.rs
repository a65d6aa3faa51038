//! File-based locking for single-process access to a storage root.
//!
//! fs2 advisory exclusive lock on <root>/LOCK, held by the one Store (and by
//! destroy_storage while it removes files). Released on Drop.
//! Acquisition never blocks: a root held by another handle is an error.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::consts::LOCK_FILE;

#[derive(Debug)]
pub struct LockGuard {
    file: std::fs::File,
    path: PathBuf,
}

impl LockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

pub fn lock_file_path(root: &Path) -> PathBuf {
    root.join(LOCK_FILE)
}

/// Try to take the exclusive lock. Returns Err if the root is already locked.
pub fn try_acquire_exclusive_lock(root: &Path) -> Result<LockGuard> {
    let path = lock_file_path(root);
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(&path)
        .with_context(|| format!("open lock file {}", path.display()))?;
    FileExt::try_lock_exclusive(&file)
        .with_context(|| format!("storage {} is already in use", root.display()))?;
    Ok(LockGuard { file, path })
}
