//! store/status - сводка о корне (для `bookstore status`).

use serde::Serialize;

use crate::metrics::{metrics_snapshot, MetricsSnapshot};

use super::core::Store;

#[derive(Debug, Clone, Serialize)]
pub struct StoreStatus {
    pub root: String,
    pub books: usize,
    pub authors: usize,
    pub book_seq: i64,
    pub has_backup: bool,
    pub backup_books: usize,
    pub backup_authors: usize,
    pub last_lsn: u64,
    pub wal_bytes: u64,
    pub wal_broken: bool,
    pub seeded: bool,
    pub created_unix_ms: u64,
    pub author_ids: String,
    pub metrics: MetricsSnapshot,
}

impl Store {
    pub fn status(&self) -> StoreStatus {
        let (backup_books, backup_authors) = self
            .tables
            .backup()
            .map(|b| (b.books.len(), b.authors.len()))
            .unwrap_or((0, 0));
        StoreStatus {
            root: self.root.display().to_string(),
            books: self.tables.books().count(),
            authors: self.tables.authors().count(),
            book_seq: self.tables.book_seq(),
            has_backup: self.tables.backup().is_some(),
            backup_books,
            backup_authors,
            last_lsn: self.last_lsn,
            wal_bytes: self.wal.len(),
            wal_broken: self.wal.is_broken(),
            seeded: self.meta.seeded(),
            created_unix_ms: self.meta.created_unix_ms,
            author_ids: self.cfg.author_ids.to_string(),
            metrics: metrics_snapshot(),
        }
    }
}
