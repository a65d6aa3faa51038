use anyhow::Result;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use bookstore::{IdStrategy, Store, StoreBuilder, StoreConfig};

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
fn defaults_match_interactive_tool() {
    let cfg = StoreConfig::default();
    assert!(cfg.wal_fsync);
    assert_eq!(cfg.author_ids, IdStrategy::Random);
    assert!(!cfg.validate_author_on_update);
    assert!(cfg.seed_data);
    assert_eq!(cfg.author_id_seed, None);
    assert!(cfg.to_string().contains("author_id_seed: entropy"));
}

#[test]
fn builder_overrides_reach_the_store() -> Result<()> {
    let cfg = StoreBuilder::from_default()
        .author_ids(IdStrategy::Sequential)
        .seed_data(false)
        .wal_fsync(false)
        .validate_author_on_update(true)
        .wal_checkpoint_bytes(4096)
        .build();
    assert!(cfg.to_string().contains("author_ids: sequential"));

    let mut store = Store::open_with_config(&unique_root("cfg-builder"), cfg)?;
    assert_eq!(store.config().wal_checkpoint_bytes, 4096);
    assert_eq!(store.add_author("First", "X")?, 1);
    assert_eq!(store.add_author("Second", "X")?, 2);
    assert_eq!(store.add_book("Book", 2, 1)?, 1);
    assert_eq!(store.status().author_ids, "sequential");
    Ok(())
}

#[test]
fn strategy_names() {
    assert_eq!(IdStrategy::parse(" SEQ "), Some(IdStrategy::Sequential));
    assert_eq!(IdStrategy::parse("random"), Some(IdStrategy::Random));
    assert_eq!(IdStrategy::parse("uuid"), None);
}
