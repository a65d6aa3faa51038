use anyhow::Result;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use bookstore::meta::meta_exists;
use bookstore::{destroy_storage, Store, StoreConfig, StoreError};

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
fn second_open_of_locked_root_fails() -> Result<()> {
    let root = unique_root("lock-twice");
    let first = Store::open_with_config(&root, StoreConfig::default())?;

    let err = Store::open_with_config(&root, StoreConfig::default())
        .err()
        .expect("second open must fail");
    assert!(matches!(err, StoreError::Storage(_)));
    assert!(err.to_string().contains("already in use"), "got: {err}");

    drop(first);
    let again = Store::open_with_config(&root, StoreConfig::default())?;
    assert_eq!(again.books().len(), 5);
    Ok(())
}

#[test]
fn destroy_removes_state_and_next_open_starts_fresh() -> Result<()> {
    let root = unique_root("lock-destroy");
    {
        let mut store = Store::open_with_config(&root, StoreConfig::default())?;
        store.delete_book(3001)?;
        store.backup()?;
        store.destroy()?;
    }
    assert!(!meta_exists(&root));

    let store = Store::open_with_config(&root, StoreConfig::default())?;
    assert!(store.book(3001).is_some());
    assert!(!store.has_backup());
    assert_eq!(store.last_lsn(), 0);
    Ok(())
}

#[test]
fn destroy_storage_respects_lock() -> Result<()> {
    let root = unique_root("lock-destroy-path");
    let store = Store::open_with_config(&root, StoreConfig::default())?;
    assert!(destroy_storage(&root).is_err());
    assert!(meta_exists(&root));

    drop(store);
    destroy_storage(&root)?;
    assert!(!meta_exists(&root));
    // absent root is fine
    destroy_storage(&root)?;
    Ok(())
}
