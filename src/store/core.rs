//! store/core - структура Store, чекпоинт и закрытие.
//!
//! Drop (если корень не уничтожен): чекпоинт образа, WAL усекается до
//! заголовка, meta.clean_shutdown=true. Ошибки в Drop только логируются.

use anyhow::Result;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::alloc::IdAllocator;
use crate::config::StoreConfig;
use crate::image::write_image;
use crate::lock::LockGuard;
use crate::meta::{set_clean_shutdown, set_last_lsn, MetaHeader};
use crate::metrics::record_checkpoint;
use crate::tables::Tables;
use crate::wal::Wal;

pub struct Store {
    pub(crate) root: PathBuf,
    pub(crate) cfg: StoreConfig,
    pub(crate) meta: MetaHeader,
    pub(crate) tables: Tables,
    pub(crate) wal: Wal,
    pub(crate) allocator: Box<dyn IdAllocator>,
    /// LSN последней закоммиченной транзакции.
    pub(crate) last_lsn: u64,
    pub(crate) destroyed: bool,
    pub(crate) _lock: LockGuard, // держим до конца Drop
}

impl Store {
    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn config(&self) -> &StoreConfig {
        &self.cfg
    }

    #[inline]
    pub fn last_lsn(&self) -> u64 {
        self.last_lsn
    }

    /// Переписать образ с текущим состоянием и усечь WAL.
    pub fn checkpoint(&mut self) -> Result<()> {
        write_image(&self.root, &self.tables, self.last_lsn)?;
        set_last_lsn(&self.root, self.last_lsn)?;
        self.meta.last_lsn = self.meta.last_lsn.max(self.last_lsn);
        let wal_bytes = self.wal.len();
        self.wal.truncate_to_header()?;
        record_checkpoint();
        info!(
            "checkpoint: {} at lsn {} (wal {} B folded)",
            self.root.display(),
            self.last_lsn,
            wal_bytes
        );
        Ok(())
    }

    /// Чекпоинт, если WAL перерос порог конфигурации.
    pub(crate) fn maybe_checkpoint(&mut self) {
        if self.wal.len() <= self.cfg.wal_checkpoint_bytes {
            return;
        }
        debug!(
            "wal {} B > {} B threshold, checkpointing",
            self.wal.len(),
            self.cfg.wal_checkpoint_bytes
        );
        // Коммит уже durable в WAL; неудачный чекпоинт повторится позже.
        if let Err(e) = self.checkpoint() {
            warn!("auto-checkpoint of {} failed: {:#}", self.root.display(), e);
        }
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        if self.destroyed {
            return;
        }
        if let Err(e) = self.checkpoint() {
            warn!("close: checkpoint of {} failed: {:#}", self.root.display(), e);
            return; // clean_shutdown остаётся false, следующий open сделает replay
        }
        if let Err(e) = set_clean_shutdown(&self.root, true) {
            warn!("close: cannot mark clean shutdown: {:#}", e);
        }
        debug!("closed {}", self.root.display());
    }
}
