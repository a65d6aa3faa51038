use anyhow::Result;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use bookstore::{run_shell, Store, StoreConfig};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("bookstore-{prefix}-{pid}-{t}-{id}"))
}

fn drive(store: &mut Store, script: &str) -> Result<String> {
    let mut out = Vec::new();
    run_shell(store, Cursor::new(script.as_bytes().to_vec()), &mut out)?;
    Ok(String::from_utf8(out)?)
}

#[test]
fn menu_session() -> Result<()> {
    let cfg = StoreConfig::default().with_wal_fsync(false);
    let mut store = Store::open_with_config(&unique_root("shell-session"), cfg)?;

    let script = "\
6
5
b
3001
1
New Book
1290
4
7
r
7
b
7
r
abc
9
0
";
    let out = drive(&mut store, script)?;

    // details
    assert!(out.contains("Title: A Tale of Two Cities\nAuthor's Name: Charles Dickens\nAuthor's Country: England"));
    // search
    assert!(out.contains("Search Results:"));
    assert!(out.contains("Book ID: 3001\nTitle: A Tale of Two Cities\nAuthor ID: 1290\nQuantity: 30"));
    // add book
    assert!(out.contains("Added New Book to the database with an ID of 3006."));
    // restore before any backup
    assert!(out.contains("Error: no backups exist"));
    assert!(out.contains("The database was backed up"));
    assert!(out.contains("Database restored to last backup"));
    assert!(out.contains("Error: Please input a number"));
    assert!(out.contains("Error: No valid option"));
    assert!(out.trim_end().ends_with("Exiting Application"));

    assert_eq!(store.book(3006).map(|b| b.qty), Some(4));
    Ok(())
}

#[test]
fn command_errors_return_to_menu() -> Result<()> {
    let cfg = StoreConfig::default().with_wal_fsync(false);
    let mut store = Store::open_with_config(&unique_root("shell-errors"), cfg)?;

    let script = "\
1
Orphan
99999
1
1
Bad qty
1290
many
3
3001
z
1
3
777
q
1
4
777
5
t
No Such Title
0
";
    let out = drive(&mut store, script)?;
    assert!(out.contains("Error: AuthorID 99999 does not exist"));
    assert!(out.contains("Error: BookID 777 does not exist"));
    assert!(out.contains("Error: no valid option 'z'"));
    assert!(out.contains("Error: There is no book with the No Such Title value."));
    assert_eq!(store.books().len(), 5);
    Ok(())
}

#[test]
fn end_of_input_exits_mid_command() -> Result<()> {
    let cfg = StoreConfig::default().with_wal_fsync(false);
    let mut store = Store::open_with_config(&unique_root("shell-eof"), cfg)?;

    let out = drive(&mut store, "1\nHalf a book\n")?;
    assert!(out.trim_end().ends_with("Exiting Application"));
    assert_eq!(store.books().len(), 5);
    Ok(())
}

#[test]
fn update_through_menu() -> Result<()> {
    let cfg = StoreConfig::default().with_wal_fsync(false);
    let mut store = Store::open_with_config(&unique_root("shell-update"), cfg)?;

    let out = drive(&mut store, "3\n3004\nT\nThe Hobbit\n4\n3005\n0\n")?;
    assert!(out.contains("Updated book 3004."));
    assert!(out.contains("The book with an ID: 3005 was deleted"));
    assert_eq!(store.book(3004).map(|b| b.title.as_str()), Some("The Hobbit"));
    assert!(store.book(3005).is_none());
    Ok(())
}
