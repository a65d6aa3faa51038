use anyhow::Result;
use std::path::PathBuf;

use bookstore::Store;

pub fn exec(path: PathBuf) -> Result<()> {
    let mut store = Store::open(&path)?;
    store.checkpoint()?;
    println!("checkpoint: {} at lsn {}", path.display(), store.last_lsn());
    Ok(())
}
