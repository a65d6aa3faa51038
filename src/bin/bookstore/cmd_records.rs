use anyhow::Result;
use std::path::PathBuf;

use bookstore::Store;

pub fn exec_add_book(path: PathBuf, title: String, author_id: i64, qty: u32) -> Result<()> {
    let mut store = Store::open(&path)?;
    let id = store.add_book(&title, author_id, qty)?;
    println!("Added {} to the database with an ID of {}.", title, id);
    Ok(())
}

pub fn exec_add_author(path: PathBuf, name: String, country: String) -> Result<()> {
    let mut store = Store::open(&path)?;
    let id = store.add_author(&name, &country)?;
    println!("Added author {} with an ID of {}.", name, id);
    Ok(())
}

pub fn exec_update_book(path: PathBuf, id: i64, field: String, value: String) -> Result<()> {
    let mut store = Store::open(&path)?;
    store.update_book_field(id, &field, &value)?;
    if let Some(b) = store.book(id) {
        println!("Updated book {}:\n{}", id, b);
    }
    Ok(())
}

pub fn exec_delete_book(path: PathBuf, id: i64) -> Result<()> {
    let mut store = Store::open(&path)?;
    store.delete_book(id)?;
    println!("The book with an ID: {} was deleted", id);
    Ok(())
}
