use anyhow::Result;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use bookstore::{IdStrategy, Store, StoreConfig};

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
fn random_ids_are_unique_and_within_width() -> Result<()> {
    let cfg = StoreConfig::default()
        .with_wal_fsync(false)
        .with_author_id_seed(Some(2024));
    let mut store = Store::open_with_config(&unique_root("alloc-unique"), cfg)?;

    let mut seen: BTreeSet<i64> = store.authors().iter().map(|a| a.id).collect();
    for i in 0..300 {
        let id = store.add_author(&format!("author {i}"), "Anywhere")?;
        assert!((1..=9999).contains(&id), "id {id} escaped the 4-digit width");
        assert!(seen.insert(id), "id {id} handed out twice");
    }
    assert_eq!(store.authors().len(), 305);
    Ok(())
}

#[test]
fn full_width_widens_to_next_digit() -> Result<()> {
    let cfg = StoreConfig::default()
        .with_wal_fsync(false)
        .with_seed_data(false)
        .with_author_id_seed(Some(5));
    let mut store = Store::open_with_config(&unique_root("alloc-widen"), cfg)?;

    let mut ids = BTreeSet::new();
    for i in 0..9 {
        ids.insert(store.add_author(&format!("a{i}"), "X")?);
    }
    // nine authors fill 1..=9 exactly
    assert_eq!(ids, (1..=9).collect::<BTreeSet<i64>>());

    let tenth = store.add_author("tenth", "X")?;
    assert!((10..=99).contains(&tenth));
    Ok(())
}

#[test]
fn seeded_random_ids_are_reproducible() -> Result<()> {
    let run = |prefix: &str| -> Result<Vec<i64>> {
        let cfg = StoreConfig::default()
            .with_wal_fsync(false)
            .with_author_id_seed(Some(99));
        let mut store = Store::open_with_config(&unique_root(prefix), cfg)?;
        let mut ids = Vec::new();
        for i in 0..10 {
            ids.push(store.add_author(&format!("n{i}"), "c")?);
        }
        Ok(ids)
    };
    assert_eq!(run("alloc-repro-a")?, run("alloc-repro-b")?);
    Ok(())
}

#[test]
fn sequential_strategy_is_max_plus_one() -> Result<()> {
    let cfg = StoreConfig::default()
        .with_wal_fsync(false)
        .with_author_ids(IdStrategy::Sequential);
    let mut store = Store::open_with_config(&unique_root("alloc-seq"), cfg)?;
    assert_eq!(store.add_author("Next", "X")?, 8938);
    assert_eq!(store.add_author("Next again", "X")?, 8939);
    Ok(())
}
