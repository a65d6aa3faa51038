//! store/snapshot - резервная копия одного поколения.
//!
//! backup:  [CreateBackupArea?] Clear(BackupBook) Clear(BackupAuthor)
//!          Copy(Book→BackupBook) Copy(Author→BackupAuthor)
//! restore: Clear(Book) Clear(Author)
//!          Copy(BackupBook→Book) Copy(BackupAuthor→Author)
//!
//! Каждая последовательность - одна TXN-запись: частичный backup/restore
//! на диске невозможен. Restore не трогает область backup.

use log::info;

use crate::error::{StoreError, StoreResult};
use crate::metrics::{record_backup, record_restore};
use crate::tables::{Op, TableId};

use super::core::Store;
use super::txn::Transaction;

impl Transaction<'_> {
    pub fn backup(&mut self) -> StoreResult<()> {
        if self.work.backup().is_none() {
            self.stage(Op::CreateBackupArea)?;
        }
        self.stage(Op::Clear(TableId::BackupBook))?;
        self.stage(Op::Clear(TableId::BackupAuthor))?;
        self.stage(Op::Copy {
            src: TableId::Book,
            dst: TableId::BackupBook,
        })?;
        self.stage(Op::Copy {
            src: TableId::Author,
            dst: TableId::BackupAuthor,
        })
    }

    pub fn restore(&mut self) -> StoreResult<()> {
        if self.work.backup().is_none() {
            return Err(StoreError::NoBackup);
        }
        self.stage(Op::Clear(TableId::Book))?;
        self.stage(Op::Clear(TableId::Author))?;
        self.stage(Op::Copy {
            src: TableId::BackupBook,
            dst: TableId::Book,
        })?;
        self.stage(Op::Copy {
            src: TableId::BackupAuthor,
            dst: TableId::Author,
        })
    }
}

impl Store {
    /// Перезаписать область backup текущими книгами и авторами.
    pub fn backup(&mut self) -> StoreResult<()> {
        self.transaction(|tx| tx.backup())?;
        record_backup();
        info!(
            "backup: {} book(s), {} author(s) at lsn {}",
            self.tables.books().count(),
            self.tables.authors().count(),
            self.last_lsn
        );
        Ok(())
    }

    /// Заменить живые таблицы содержимым области backup.
    pub fn restore(&mut self) -> StoreResult<()> {
        self.transaction(|tx| tx.restore())?;
        record_restore();
        info!(
            "restore: {} book(s), {} author(s) at lsn {}",
            self.tables.books().count(),
            self.tables.authors().count(),
            self.last_lsn
        );
        Ok(())
    }
}
