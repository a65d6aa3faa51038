//! store/open - открытие корня с конфигом и эксклюзивной блокировкой.
//!
//! Последовательность: LOCK → init (если нет meta) → образ → replay WAL →
//! чекпоинт → clean_shutdown=false.

use anyhow::Context;
use log::{debug, info, warn};
use std::fs;
use std::path::Path;

use crate::alloc::allocator_from_config;
use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::image::{read_image, write_image};
use crate::lock::try_acquire_exclusive_lock;
use crate::meta::{meta_exists, read_meta, set_clean_shutdown, write_meta_new, MetaHeader, FLAG_SEEDED};
use crate::seed::seed_tables;
use crate::tables::Tables;
use crate::wal::{replay_into, Wal};

use super::core::Store;

impl Store {
    /// Открыть (или создать) корень с конфигурацией из окружения.
    pub fn open(root: &Path) -> StoreResult<Self> {
        Self::open_with_config(root, StoreConfig::from_env())
    }

    pub fn open_with_config(root: &Path, cfg: StoreConfig) -> StoreResult<Self> {
        if !root.exists() {
            fs::create_dir_all(root)
                .with_context(|| format!("create root {}", root.display()))?;
        }
        let lock = try_acquire_exclusive_lock(root)?;

        if !meta_exists(root) {
            Self::init(root, &cfg)?;
        }
        let meta = read_meta(root)?;
        if !meta.clean_shutdown {
            warn!(
                "{} was not closed cleanly, recovering from WAL",
                root.display()
            );
        }

        let (mut tables, image_lsn) = read_image(root)?;
        let replay = replay_into(root, &mut tables, image_lsn)?;
        let wal = Wal::open_for_append(root)?;

        let mut store = Self {
            root: root.to_path_buf(),
            allocator: allocator_from_config(&cfg),
            cfg,
            meta,
            tables,
            wal,
            last_lsn: replay.last_lsn,
            destroyed: false,
            _lock: lock,
        };

        store.checkpoint()?;
        set_clean_shutdown(root, false)?;
        store.meta.clean_shutdown = false;

        info!(
            "opened {}: {} book(s), {} author(s), backup={}, lsn={} (replayed {})",
            root.display(),
            store.tables.books().count(),
            store.tables.authors().count(),
            store.tables.backup().is_some(),
            store.last_lsn,
            replay.applied
        );
        debug!("config: {}", store.cfg);
        Ok(store)
    }

    /// Инициализировать пустой корень: образ (lsn 0), пустой WAL, затем meta.
    /// meta пишется последней: её наличие означает завершённую инициализацию.
    fn init(root: &Path, cfg: &StoreConfig) -> StoreResult<()> {
        let tables = if cfg.seed_data {
            seed_tables()?
        } else {
            Tables::new()
        };
        write_image(root, &tables, 0)?;
        Wal::create(root)?;

        let meta = MetaHeader {
            flags: if cfg.seed_data { FLAG_SEEDED } else { 0 },
            ..MetaHeader::default()
        };
        write_meta_new(root, &meta)?;
        info!(
            "initialized storage at {} (seed data: {})",
            root.display(),
            cfg.seed_data
        );
        Ok(())
    }
}
