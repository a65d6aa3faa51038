use anyhow::Result;
use std::path::PathBuf;

use bookstore::Store;

pub fn exec_backup(path: PathBuf) -> Result<()> {
    let mut store = Store::open(&path)?;
    store.backup()?;
    println!(
        "The database was backed up ({} book(s), {} author(s))",
        store.backup_books().len(),
        store.backup_authors().len()
    );
    Ok(())
}

pub fn exec_restore(path: PathBuf) -> Result<()> {
    let mut store = Store::open(&path)?;
    store.restore()?;
    println!("Database restored to last backup");
    Ok(())
}
