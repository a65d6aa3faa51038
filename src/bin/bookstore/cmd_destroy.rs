use anyhow::{bail, Result};
use std::path::PathBuf;

use bookstore::destroy_storage;

pub fn exec(path: PathBuf, yes: bool) -> Result<()> {
    if !yes {
        bail!(
            "refusing to destroy {} without --yes",
            path.display()
        );
    }
    destroy_storage(&path)?;
    println!("Deleted entire database at {}", path.display());
    Ok(())
}
