//! Row types and selectors shared by the store, the query service and the shell.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

pub type BookId = i64;
pub type AuthorId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author_id: AuthorId,
    pub qty: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    pub country: String,
}

/// One row of the details report (book joined with its author).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookDetail {
    pub title: String,
    pub author_name: String,
    pub author_country: String,
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Book ID: {}\nTitle: {}\nAuthor ID: {}\nQuantity: {}",
            self.id, self.title, self.author_id, self.qty
        )
    }
}

impl fmt::Display for BookDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Title: {}\nAuthor's Name: {}\nAuthor's Country: {}",
            self.title, self.author_name, self.author_country
        )
    }
}

// ---------------- update selectors ----------------

/// Book column selected for an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookField {
    AuthorId,
    Title,
    Qty,
}

impl BookField {
    pub const EXPECTED: &'static str = "a (author id), t (title), q (quantity)";

    pub fn name(self) -> &'static str {
        match self {
            BookField::AuthorId => "author id",
            BookField::Title => "title",
            BookField::Qty => "quantity",
        }
    }

    /// Parse a raw value for this column.
    pub fn parse_value(self, raw: &str) -> Result<BookUpdate, StoreError> {
        let invalid = || StoreError::InvalidValue {
            field: self.name(),
            value: raw.to_string(),
        };
        match self {
            BookField::AuthorId => raw
                .trim()
                .parse::<AuthorId>()
                .map(BookUpdate::AuthorId)
                .map_err(|_| invalid()),
            BookField::Title => Ok(BookUpdate::Title(raw.to_string())),
            BookField::Qty => raw
                .trim()
                .parse::<u32>()
                .map(BookUpdate::Qty)
                .map_err(|_| invalid()),
        }
    }
}

impl FromStr for BookField {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "author" | "authorid" | "author_id" => Ok(BookField::AuthorId),
            "t" | "title" => Ok(BookField::Title),
            "q" | "qty" | "quantity" => Ok(BookField::Qty),
            _ => Err(StoreError::invalid_option(s, Self::EXPECTED)),
        }
    }
}

/// New value for exactly one book column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookUpdate {
    AuthorId(AuthorId),
    Title(String),
    Qty(u32),
}

impl BookUpdate {
    pub fn field(&self) -> BookField {
        match self {
            BookUpdate::AuthorId(_) => BookField::AuthorId,
            BookUpdate::Title(_) => BookField::Title,
            BookUpdate::Qty(_) => BookField::Qty,
        }
    }

    pub(crate) fn apply_to(&self, book: &mut Book) {
        match self {
            BookUpdate::AuthorId(a) => book.author_id = *a,
            BookUpdate::Title(t) => book.title = t.clone(),
            BookUpdate::Qty(q) => book.qty = *q,
        }
    }
}

// ---------------- search selectors ----------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    AuthorId,
    Title,
    Id,
}

impl SearchField {
    pub const EXPECTED: &'static str = "a (author id), t (title), b (book id)";

    /// Build a search key from a raw value. A non-numeric value for a numeric
    /// column yields `None`: such a search matches nothing.
    pub fn key(self, raw: &str) -> Option<SearchKey> {
        match self {
            SearchField::AuthorId => raw.trim().parse().ok().map(SearchKey::AuthorId),
            SearchField::Title => Some(SearchKey::Title(raw.to_string())),
            SearchField::Id => raw.trim().parse().ok().map(SearchKey::Id),
        }
    }
}

impl FromStr for SearchField {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "author" | "authorid" | "author_id" => Ok(SearchField::AuthorId),
            "t" | "title" => Ok(SearchField::Title),
            "b" | "id" | "bookid" | "book_id" => Ok(SearchField::Id),
            _ => Err(StoreError::invalid_option(s, Self::EXPECTED)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchKey {
    AuthorId(AuthorId),
    Title(String),
    Id(BookId),
}

impl SearchKey {
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            SearchKey::AuthorId(a) => book.author_id == *a,
            SearchKey::Title(t) => book.title == *t,
            SearchKey::Id(id) => book.id == *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_accept_menu_letters_and_names() {
        assert_eq!("A".parse::<BookField>().unwrap(), BookField::AuthorId);
        assert_eq!("title".parse::<BookField>().unwrap(), BookField::Title);
        assert_eq!("q".parse::<BookField>().unwrap(), BookField::Qty);
        assert_eq!("b".parse::<SearchField>().unwrap(), SearchField::Id);
        assert!(matches!(
            "x".parse::<BookField>(),
            Err(StoreError::InvalidOption { .. })
        ));
        // "b" is a search selector only
        assert!("b".parse::<BookField>().is_err());
    }

    #[test]
    fn qty_rejects_negative() {
        assert!(matches!(
            BookField::Qty.parse_value("-3"),
            Err(StoreError::InvalidValue { field: "quantity", .. })
        ));
        assert_eq!(BookField::Qty.parse_value(" 7 ").unwrap(), BookUpdate::Qty(7));
    }

    #[test]
    fn non_numeric_search_value_has_no_key() {
        assert_eq!(SearchField::Id.key("abc"), None);
        assert_eq!(
            SearchField::Title.key("abc"),
            Some(SearchKey::Title("abc".into()))
        );
    }
}
