//! store/records - мутации книг и авторов.
//!
//! Методы Transaction делают проверки и стейджат Op; одноимённые методы
//! Store оборачивают каждую операцию в собственную транзакцию.

use log::debug;

use crate::error::{StoreError, StoreResult};
use crate::model::{Author, AuthorId, Book, BookField, BookId, BookUpdate};
use crate::tables::Op;

use super::core::Store;
use super::txn::Transaction;

impl Transaction<'_> {
    /// Новая книга со следующим id последовательности.
    pub fn insert_book(&mut self, title: &str, author_id: AuthorId, qty: u32) -> StoreResult<BookId> {
        if self.work.author(author_id).is_none() {
            return Err(StoreError::Reference(author_id));
        }
        let id = self.work.next_book_id()?;
        self.stage(Op::InsertBook(Book {
            id,
            title: title.to_string(),
            author_id,
            qty,
        }))?;
        Ok(id)
    }

    pub fn insert_author(&mut self, name: &str, country: &str) -> StoreResult<AuthorId> {
        let id = self.allocator.allocate(&self.work)?;
        self.stage(Op::InsertAuthor(Author {
            id,
            name: name.to_string(),
            country: country.to_string(),
        }))?;
        Ok(id)
    }

    /// Обновить ровно одно поле книги `id`.
    pub fn update_book(&mut self, id: BookId, update: BookUpdate) -> StoreResult<()> {
        let mut row = self
            .work
            .book(id)
            .cloned()
            .ok_or(StoreError::NotFound(id))?;
        if let BookUpdate::AuthorId(author_id) = update {
            if self.cfg.validate_author_on_update && self.work.author(author_id).is_none() {
                return Err(StoreError::Reference(author_id));
            }
        }
        update.apply_to(&mut row);
        self.stage(Op::UpdateBook(row))
    }

    pub fn delete_book(&mut self, id: BookId) -> StoreResult<()> {
        if self.work.book(id).is_none() {
            return Err(StoreError::NotFound(id));
        }
        self.stage(Op::DeleteBook(id))
    }
}

impl Store {
    pub fn add_book(&mut self, title: &str, author_id: AuthorId, qty: u32) -> StoreResult<BookId> {
        let id = self.transaction(|tx| tx.insert_book(title, author_id, qty))?;
        debug!("add_book: id={} author={}", id, author_id);
        Ok(id)
    }

    pub fn add_author(&mut self, name: &str, country: &str) -> StoreResult<AuthorId> {
        let id = self.transaction(|tx| tx.insert_author(name, country))?;
        debug!("add_author: id={}", id);
        Ok(id)
    }

    pub fn update_book(&mut self, id: BookId, update: BookUpdate) -> StoreResult<()> {
        let field = update.field();
        self.transaction(|tx| tx.update_book(id, update))?;
        debug!("update_book: id={} field={}", id, field.name());
        Ok(())
    }

    /// Строковая точка входа: сначала существование книги, затем селектор
    /// поля, затем значение.
    pub fn update_book_field(&mut self, id: BookId, field: &str, value: &str) -> StoreResult<()> {
        if self.tables.book(id).is_none() {
            return Err(StoreError::NotFound(id));
        }
        let field: BookField = field.parse()?;
        let update = field.parse_value(value)?;
        self.update_book(id, update)
    }

    pub fn delete_book(&mut self, id: BookId) -> StoreResult<()> {
        self.transaction(|tx| tx.delete_book(id))?;
        debug!("delete_book: id={}", id);
        Ok(())
    }
}
