use anyhow::Result;
use std::path::PathBuf;

use bookstore::Store;

/// When json=true prints one JSON object.
pub fn exec_with_json(path: PathBuf, json: bool) -> Result<()> {
    let store = Store::open(&path)?;
    let st = store.status();

    if json {
        println!("{}", serde_json::to_string_pretty(&st)?);
        return Ok(());
    }

    println!("root:        {}", st.root);
    println!("books:       {}", st.books);
    println!("authors:     {}", st.authors);
    println!("book_seq:    {}", st.book_seq);
    if st.has_backup {
        println!(
            "backup:      {} book(s), {} author(s)",
            st.backup_books, st.backup_authors
        );
    } else {
        println!("backup:      none");
    }
    println!("last_lsn:    {}", st.last_lsn);
    println!("wal_bytes:   {}", st.wal_bytes);
    println!("seeded:      {}", st.seeded);
    println!("created_ms:  {}", st.created_unix_ms);
    println!("author_ids:  {}", st.author_ids);
    println!(
        "txn:         commits={} rollbacks={} replayed={}",
        st.metrics.txn_commits, st.metrics.txn_rollbacks, st.metrics.replayed_txns
    );
    Ok(())
}
