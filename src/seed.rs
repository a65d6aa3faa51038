//! Fixture data written when a storage root is created.

use anyhow::Result;

use crate::model::{Author, Book};
use crate::tables::{Op, Tables};

pub const SEED_BOOKS: &[(i64, &str, i64, u32)] = &[
    (3001, "A Tale of Two Cities", 1290, 30),
    (3002, "Harry Potter and the Philosopher's Stone", 8937, 40),
    (3003, "The Lion, the Witch and the Wardrobe", 2356, 25),
    (3004, "The Lord of the Rings", 6380, 37),
    (3005, "Alice's Adventures in Wonderland", 5620, 12),
];

pub const SEED_AUTHORS: &[(i64, &str, &str)] = &[
    (1290, "Charles Dickens", "England"),
    (8937, "J.K. Rowling", "England"),
    (2356, "C.S. Lewis", "Ireland"),
    (6380, "J.R.R. Tolkien", "South Africa"),
    (5620, "Lewis Carroll", "England"),
];

pub fn seed_ops() -> Vec<Op> {
    let books = SEED_BOOKS.iter().map(|&(id, title, author_id, qty)| {
        Op::InsertBook(Book {
            id,
            title: title.to_string(),
            author_id,
            qty,
        })
    });
    let authors = SEED_AUTHORS.iter().map(|&(id, name, country)| {
        Op::InsertAuthor(Author {
            id,
            name: name.to_string(),
            country: country.to_string(),
        })
    });
    books.chain(authors).collect()
}

/// Tables holding only the fixture rows.
pub fn seed_tables() -> Result<Tables> {
    let mut t = Tables::new();
    for op in seed_ops() {
        t.apply(&op)?;
    }
    Ok(t)
}
