use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use bookstore::consts::{WAL_FILE, WAL_HDR_SIZE};
use bookstore::{Store, StoreConfig, StoreError};

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

#[test]
fn failed_closure_leaves_no_trace() -> Result<()> {
    let root = unique_root("txn-rollback");
    let mut store = Store::open_with_config(&root, StoreConfig::default())?;
    let lsn = store.last_lsn();

    let res = store.transaction(|tx| {
        let a = tx.insert_author("Ghost", "Nowhere")?;
        tx.insert_book("Ghost story", a, 1)?;
        tx.backup()?;
        tx.delete_book(424242)
    });
    assert!(matches!(res, Err(StoreError::NotFound(424242))));

    assert_eq!(store.authors().len(), 5);
    assert_eq!(store.books().len(), 5);
    assert_eq!(store.book_seq(), 3005);
    assert!(!store.has_backup());
    assert_eq!(store.last_lsn(), lsn);
    assert_eq!(fs::metadata(root.join(WAL_FILE))?.len(), WAL_HDR_SIZE as u64);
    Ok(())
}

#[test]
fn grouped_mutations_commit_as_one_record() -> Result<()> {
    let root = unique_root("txn-group");
    let (author, book) = {
        let mut store = Store::open_with_config(&root, StoreConfig::default())?;
        let (author, book) = store.transaction(|tx| {
            let a = tx.insert_author("Terry Pratchett", "England")?;
            // staged author is visible to the rest of the transaction
            let b = tx.insert_book("Mort", a, 9)?;
            assert_eq!(tx.staged(), 2);
            assert!(tx.tables().book(b).is_some());
            Ok((a, b))
        })?;
        assert_eq!(store.last_lsn(), 1);
        (author, book)
    };

    let store = Store::open_with_config(&root, StoreConfig::default())?;
    assert_eq!(store.book(book).map(|b| b.author_id), Some(author));
    Ok(())
}

#[test]
fn empty_transaction_writes_nothing() -> Result<()> {
    let root = unique_root("txn-empty");
    let mut store = Store::open_with_config(&root, StoreConfig::default())?;
    let n = store.transaction(|tx| Ok(tx.tables().books().count()))?;
    assert_eq!(n, 5);
    assert_eq!(store.last_lsn(), 0);
    Ok(())
}

#[test]
fn wal_over_threshold_is_checkpointed() -> Result<()> {
    let root = unique_root("txn-autockpt");
    let cfg = StoreConfig::default().with_wal_checkpoint_bytes(1);
    let mut store = Store::open_with_config(&root, cfg)?;
    store.add_book("Folded", 1290, 1)?;
    assert_eq!(store.status().wal_bytes, WAL_HDR_SIZE as u64);
    assert_eq!(fs::metadata(root.join(WAL_FILE))?.len(), WAL_HDR_SIZE as u64);
    assert_eq!(store.last_lsn(), 1);

    store.add_book("Folded too", 1290, 1)?;
    assert_eq!(store.last_lsn(), 2);
    Ok(())
}
