//! store/txn - транзакции поверх рабочей копии таблиц.
//!
//! Операции стейджатся на клоне `Tables`; при коммите все Op кодируются в
//! одну TXN-запись WAL. Копия публикуется только после успешного append
//! (и fsync, если включён). Err из замыкания или сбой WAL - состояние Store
//! не меняется.

use log::debug;

use crate::alloc::IdAllocator;
use crate::codec::encode_txn;
use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::metrics::{record_txn_commit, record_txn_rollback};
use crate::tables::{Op, Tables};

use super::core::Store;

pub struct Transaction<'a> {
    pub(crate) work: Tables,
    ops: Vec<Op>,
    pub(crate) allocator: &'a mut Box<dyn IdAllocator>,
    pub(crate) cfg: &'a StoreConfig,
}

impl Transaction<'_> {
    /// Состояние таблиц с учётом уже застейдженных операций.
    #[inline]
    pub fn tables(&self) -> &Tables {
        &self.work
    }

    /// Число операций, которые уйдут в WAL при коммите.
    #[inline]
    pub fn staged(&self) -> usize {
        self.ops.len()
    }

    pub(crate) fn stage(&mut self, op: Op) -> StoreResult<()> {
        self.work.apply(&op)?;
        self.ops.push(op);
        Ok(())
    }
}

impl Store {
    /// Выполнить `f` атомарно: либо все изменения durable, либо ни одного.
    pub fn transaction<T, F>(&mut self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> StoreResult<T>,
    {
        let mut tx = Transaction {
            work: self.tables.clone(),
            ops: Vec::new(),
            allocator: &mut self.allocator,
            cfg: &self.cfg,
        };

        let out = match f(&mut tx) {
            Ok(v) => v,
            Err(e) => {
                record_txn_rollback();
                debug!("txn: rolled back ({} staged op(s)): {}", tx.ops.len(), e);
                return Err(e);
            }
        };

        let Transaction { work, ops, .. } = tx;
        if ops.is_empty() {
            return Ok(out);
        }
        self.commit(work, ops)?;
        Ok(out)
    }

    fn commit(&mut self, work: Tables, ops: Vec<Op>) -> StoreResult<()> {
        let payload = encode_txn(&ops)?;
        let lsn = self.last_lsn + 1;
        if let Err(e) = self.wal.commit_record(lsn, &payload, self.cfg.wal_fsync) {
            record_txn_rollback();
            return Err(e.into());
        }
        self.tables = work;
        self.last_lsn = lsn;
        record_txn_commit();
        debug!("txn: committed lsn={} ({} op(s))", lsn, ops.len());

        self.maybe_checkpoint();
        Ok(())
    }
}
