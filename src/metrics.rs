//! Lightweight global metrics for the bookstore store.
//!
//! Потокобезопасные атомарные счётчики для подсистем:
//! - транзакции (commit/rollback)
//! - WAL (append/fsync/truncate) и чекпоинты
//! - replay при открытии
//! - backup / restore
//! - аллокатор id авторов

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

// ----- Transactions -----
static TXN_COMMITS: AtomicU64 = AtomicU64::new(0);
static TXN_ROLLBACKS: AtomicU64 = AtomicU64::new(0);

// ----- WAL -----
static WAL_APPENDS_TOTAL: AtomicU64 = AtomicU64::new(0);
static WAL_BYTES_WRITTEN: AtomicU64 = AtomicU64::new(0);
static WAL_FSYNC_CALLS: AtomicU64 = AtomicU64::new(0);
static WAL_TRUNCATIONS: AtomicU64 = AtomicU64::new(0);
static CHECKPOINTS: AtomicU64 = AtomicU64::new(0);
static REPLAYED_TXNS: AtomicU64 = AtomicU64::new(0);

// ----- Backup / Restore -----
static BACKUPS: AtomicU64 = AtomicU64::new(0);
static RESTORES: AtomicU64 = AtomicU64::new(0);

// ----- Author id allocation -----
static ALLOC_DRAWS: AtomicU64 = AtomicU64::new(0);
static ALLOC_WIDENINGS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    pub txn_commits: u64,
    pub txn_rollbacks: u64,

    pub wal_appends_total: u64,
    pub wal_bytes_written: u64,
    pub wal_fsync_calls: u64,
    pub wal_truncations: u64,
    pub checkpoints: u64,
    pub replayed_txns: u64,

    pub backups: u64,
    pub restores: u64,

    pub alloc_draws: u64,
    pub alloc_widenings: u64,
}

// ----- Recorders (transactions) -----
pub fn record_txn_commit() {
    TXN_COMMITS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_txn_rollback() {
    TXN_ROLLBACKS.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (WAL) -----
pub fn record_wal_append(bytes: usize) {
    WAL_APPENDS_TOTAL.fetch_add(1, Ordering::Relaxed);
    WAL_BYTES_WRITTEN.fetch_add(bytes as u64, Ordering::Relaxed);
}

pub fn record_wal_fsync() {
    WAL_FSYNC_CALLS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_wal_truncation() {
    WAL_TRUNCATIONS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_checkpoint() {
    CHECKPOINTS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_replayed_txns(n: u64) {
    REPLAYED_TXNS.fetch_add(n, Ordering::Relaxed);
}

// ----- Recorders (backup / restore) -----
pub fn record_backup() {
    BACKUPS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_restore() {
    RESTORES.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (allocator) -----
pub fn record_alloc_draw() {
    ALLOC_DRAWS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_alloc_widen() {
    ALLOC_WIDENINGS.fetch_add(1, Ordering::Relaxed);
}

// ----- Snapshot -----
pub fn metrics_snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        txn_commits: TXN_COMMITS.load(Ordering::Relaxed),
        txn_rollbacks: TXN_ROLLBACKS.load(Ordering::Relaxed),

        wal_appends_total: WAL_APPENDS_TOTAL.load(Ordering::Relaxed),
        wal_bytes_written: WAL_BYTES_WRITTEN.load(Ordering::Relaxed),
        wal_fsync_calls: WAL_FSYNC_CALLS.load(Ordering::Relaxed),
        wal_truncations: WAL_TRUNCATIONS.load(Ordering::Relaxed),
        checkpoints: CHECKPOINTS.load(Ordering::Relaxed),
        replayed_txns: REPLAYED_TXNS.load(Ordering::Relaxed),

        backups: BACKUPS.load(Ordering::Relaxed),
        restores: RESTORES.load(Ordering::Relaxed),

        alloc_draws: ALLOC_DRAWS.load(Ordering::Relaxed),
        alloc_widenings: ALLOC_WIDENINGS.load(Ordering::Relaxed),
    }
}
