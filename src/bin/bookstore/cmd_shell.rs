use anyhow::Result;
use std::io;
use std::path::PathBuf;

use bookstore::{run_shell, Store};

pub fn exec(path: PathBuf) -> Result<()> {
    let mut store = Store::open(&path)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_shell(&mut store, stdin.lock(), stdout.lock())
}
