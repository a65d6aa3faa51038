//! tables - in-memory state of the four relations and the logical operations
//! applied to it.
//!
//! Relations:
//! - Book / Author                 - live data;
//! - BackupBook / BackupAuthor     - shadow copy (single generation), absent
//!                                   until the first backup.
//!
//! Every mutation is expressed as an `Op`. Ops are deterministic: replaying the
//! same sequence on the same starting state yields the same state, which is
//! what the WAL relies on.

use anyhow::{anyhow, bail, Result};
use std::collections::BTreeMap;

use crate::alloc::AuthorIds;
use crate::model::{Author, AuthorId, Book, BookId};

/// Relation identifier used by `Op::Clear` / `Op::Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableId {
    Book,
    Author,
    BackupBook,
    BackupAuthor,
}

impl TableId {
    pub fn tag(self) -> u8 {
        match self {
            TableId::Book => 1,
            TableId::Author => 2,
            TableId::BackupBook => 3,
            TableId::BackupAuthor => 4,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self> {
        Ok(match tag {
            1 => TableId::Book,
            2 => TableId::Author,
            3 => TableId::BackupBook,
            4 => TableId::BackupAuthor,
            other => bail!("unknown table tag {}", other),
        })
    }

    fn holds_books(self) -> bool {
        matches!(self, TableId::Book | TableId::BackupBook)
    }
}

/// Logical operation carried by a WAL transaction record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    InsertBook(Book),
    InsertAuthor(Author),
    /// Full row after the update.
    UpdateBook(Book),
    DeleteBook(BookId),
    CreateBackupArea,
    Clear(TableId),
    /// INSERT INTO dst SELECT * FROM src (ids verbatim).
    Copy { src: TableId, dst: TableId },
}

/// Shadow relations of the backup area.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupArea {
    pub(crate) books: BTreeMap<BookId, Book>,
    pub(crate) authors: BTreeMap<AuthorId, Author>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tables {
    pub(crate) books: BTreeMap<BookId, Book>,
    pub(crate) authors: BTreeMap<AuthorId, Author>,
    /// Largest book id ever inserted (AUTOINCREMENT sequence).
    pub(crate) book_seq: BookId,
    pub(crate) backup: Option<BackupArea>,
}

impl Tables {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn next_book_id(&self) -> Result<BookId> {
        self.book_seq
            .checked_add(1)
            .ok_or_else(|| anyhow!("book id sequence exhausted"))
    }

    pub fn books(&self) -> impl Iterator<Item = &Book> {
        self.books.values()
    }

    pub fn authors(&self) -> impl Iterator<Item = &Author> {
        self.authors.values()
    }

    pub fn book(&self, id: BookId) -> Option<&Book> {
        self.books.get(&id)
    }

    pub fn author(&self, id: AuthorId) -> Option<&Author> {
        self.authors.get(&id)
    }

    pub fn backup(&self) -> Option<&BackupArea> {
        self.backup.as_ref()
    }

    pub fn book_seq(&self) -> BookId {
        self.book_seq
    }

    /// Применить одну операцию. Ошибка означает нарушение ограничений таблиц
    /// (дубликат ключа, отсутствующая таблица) - вызывающий код откатывает
    /// всю транзакцию.
    pub fn apply(&mut self, op: &Op) -> Result<()> {
        match op {
            Op::InsertBook(b) => {
                insert_book_row(&mut self.books, b.clone(), "book")?;
                self.book_seq = self.book_seq.max(b.id);
            }
            Op::InsertAuthor(a) => {
                insert_author_row(&mut self.authors, a.clone(), "author")?;
            }
            Op::UpdateBook(b) => {
                let slot = self
                    .books
                    .get_mut(&b.id)
                    .ok_or_else(|| anyhow!("update of missing book {}", b.id))?;
                *slot = b.clone();
            }
            Op::DeleteBook(id) => {
                if self.books.remove(id).is_none() {
                    bail!("delete of missing book {}", id);
                }
            }
            Op::CreateBackupArea => {
                if self.backup.is_some() {
                    bail!("backup area already exists");
                }
                self.backup = Some(BackupArea::default());
            }
            Op::Clear(t) => match t {
                TableId::Book => self.books.clear(),
                TableId::Author => self.authors.clear(),
                TableId::BackupBook => self.backup_mut()?.books.clear(),
                TableId::BackupAuthor => self.backup_mut()?.authors.clear(),
            },
            Op::Copy { src, dst } => self.copy_table(*src, *dst)?,
        }
        Ok(())
    }

    fn backup_mut(&mut self) -> Result<&mut BackupArea> {
        self.backup
            .as_mut()
            .ok_or_else(|| anyhow!("no such table: backup area does not exist"))
    }

    fn copy_table(&mut self, src: TableId, dst: TableId) -> Result<()> {
        if src == dst || src.holds_books() != dst.holds_books() {
            bail!("incompatible copy {:?} -> {:?}", src, dst);
        }
        if src.holds_books() {
            let rows: Vec<Book> = match src {
                TableId::Book => self.books.values().cloned().collect(),
                _ => self.backup_mut()?.books.values().cloned().collect(),
            };
            let max_id = rows.iter().map(|b| b.id).max();
            {
                let target = match dst {
                    TableId::Book => &mut self.books,
                    _ => &mut self.backup_mut()?.books,
                };
                for row in rows {
                    insert_book_row(target, row, "book")?;
                }
            }
            if dst == TableId::Book {
                if let Some(m) = max_id {
                    self.book_seq = self.book_seq.max(m);
                }
            }
        } else {
            let rows: Vec<Author> = match src {
                TableId::Author => self.authors.values().cloned().collect(),
                _ => self.backup_mut()?.authors.values().cloned().collect(),
            };
            let target = match dst {
                TableId::Author => &mut self.authors,
                _ => &mut self.backup_mut()?.authors,
            };
            for row in rows {
                insert_author_row(target, row, "author")?;
            }
        }
        Ok(())
    }
}

fn insert_book_row(t: &mut BTreeMap<BookId, Book>, row: Book, what: &str) -> Result<()> {
    if t.contains_key(&row.id) {
        bail!("duplicate {} id {}", what, row.id);
    }
    t.insert(row.id, row);
    Ok(())
}

fn insert_author_row(t: &mut BTreeMap<AuthorId, Author>, row: Author, what: &str) -> Result<()> {
    if t.contains_key(&row.id) {
        bail!("duplicate {} id {}", what, row.id);
    }
    t.insert(row.id, row);
    Ok(())
}

impl AuthorIds for Tables {
    fn max_author_id(&self) -> Option<AuthorId> {
        self.authors.keys().next_back().copied()
    }

    fn author_count(&self) -> usize {
        self.authors.len()
    }

    fn author_exists(&self, id: AuthorId) -> bool {
        self.authors.contains_key(&id)
    }
}
