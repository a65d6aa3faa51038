use anyhow::Result;
use std::path::PathBuf;

use bookstore::Store;

const SEPARATOR: &str = "--------------------------------";

pub fn exec_search(path: PathBuf, by: String, value: String, json: bool) -> Result<()> {
    let store = Store::open(&path)?;
    let books = store.search_books_by(&by, &value)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&books)?);
        return Ok(());
    }
    if books.is_empty() {
        println!("No book with the {} value.", value);
        return Ok(());
    }
    println!("Search Results:");
    for b in &books {
        println!("{}\n{}", SEPARATOR, b);
    }
    Ok(())
}

pub fn exec_details(path: PathBuf, json: bool) -> Result<()> {
    let store = Store::open(&path)?;
    let rows = store.list_details();
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    println!("Details");
    for d in &rows {
        println!("{}\n{}", SEPARATOR, d);
    }
    Ok(())
}
