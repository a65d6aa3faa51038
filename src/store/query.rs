//! store/query - поиск книг и отчёт details. Только чтение.

use crate::error::StoreResult;
use crate::model::{Author, AuthorId, Book, BookDetail, BookId, SearchField, SearchKey};
use crate::tables::Tables;

use super::core::Store;

impl Tables {
    /// Книги, совпавшие с ключом, по возрастанию id.
    pub fn search(&self, key: &SearchKey) -> Vec<Book> {
        self.books().filter(|b| key.matches(b)).cloned().collect()
    }

    /// Inner join книг с авторами; книги без автора пропускаются.
    pub fn details(&self) -> Vec<BookDetail> {
        self.books()
            .filter_map(|b| {
                self.author(b.author_id).map(|a| BookDetail {
                    title: b.title.clone(),
                    author_name: a.name.clone(),
                    author_country: a.country.clone(),
                })
            })
            .collect()
    }
}

impl Store {
    pub fn search_books(&self, key: &SearchKey) -> Vec<Book> {
        self.tables.search(key)
    }

    /// Строковая точка входа. Нечисловое значение для числового поля
    /// ничего не находит.
    pub fn search_books_by(&self, field: &str, value: &str) -> StoreResult<Vec<Book>> {
        let field: SearchField = field.parse()?;
        Ok(match field.key(value) {
            Some(key) => self.tables.search(&key),
            None => Vec::new(),
        })
    }

    pub fn list_details(&self) -> Vec<BookDetail> {
        self.tables.details()
    }

    pub fn books(&self) -> Vec<Book> {
        self.tables.books().cloned().collect()
    }

    pub fn authors(&self) -> Vec<Author> {
        self.tables.authors().cloned().collect()
    }

    pub fn book(&self, id: BookId) -> Option<&Book> {
        self.tables.book(id)
    }

    pub fn author(&self, id: AuthorId) -> Option<&Author> {
        self.tables.author(id)
    }

    /// Последний выданный id книги (AUTOINCREMENT).
    pub fn book_seq(&self) -> BookId {
        self.tables.book_seq()
    }

    pub fn has_backup(&self) -> bool {
        self.tables.backup().is_some()
    }

    /// Содержимое области backup (пусто, если backup не делался).
    pub fn backup_books(&self) -> Vec<Book> {
        self.tables
            .backup()
            .map(|b| b.books.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn backup_authors(&self) -> Vec<Author> {
        self.tables
            .backup()
            .map(|b| b.authors.values().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed_tables;
    use crate::tables::Op;

    #[test]
    fn details_skip_dangling_books() {
        let mut t = seed_tables().unwrap();
        t.apply(&Op::InsertBook(Book {
            id: 4000,
            title: "Orphan".into(),
            author_id: 77,
            qty: 1,
        }))
        .unwrap();

        let details = t.details();
        assert_eq!(details.len(), 5);
        assert!(details.iter().all(|d| d.title != "Orphan"));
        assert_eq!(
            details[0],
            BookDetail {
                title: "A Tale of Two Cities".into(),
                author_name: "Charles Dickens".into(),
                author_country: "England".into(),
            }
        );
    }

    #[test]
    fn search_by_each_key() {
        let t = seed_tables().unwrap();
        let by_id = t.search(&SearchKey::Id(3004));
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].title, "The Lord of the Rings");

        assert_eq!(t.search(&SearchKey::AuthorId(5620))[0].id, 3005);
        assert_eq!(
            t.search(&SearchKey::Title("A Tale of Two Cities".into()))[0].id,
            3001
        );
        assert!(t.search(&SearchKey::Title("a tale of two cities".into())).is_empty());
    }
}
