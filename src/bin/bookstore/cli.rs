use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI книжного склада. Каждая команда открывает корень, делает одну
/// операцию и закрывает его (чекпоинт + clean shutdown).
#[derive(Parser, Debug)]
#[command(name = "bookstore", version, about = "Bookstore inventory CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Add a book for an existing author
    AddBook {
        #[arg(long, default_value = "ebookstore")]
        path: PathBuf,
        #[arg(long)]
        title: String,
        #[arg(long)]
        author_id: i64,
        #[arg(long)]
        qty: u32,
    },
    /// Add an author (id is allocated by the store)
    AddAuthor {
        #[arg(long, default_value = "ebookstore")]
        path: PathBuf,
        #[arg(long)]
        name: String,
        #[arg(long)]
        country: String,
    },
    /// Update one field of a book: a (author id), t (title), q (quantity)
    UpdateBook {
        #[arg(long, default_value = "ebookstore")]
        path: PathBuf,
        #[arg(long)]
        id: i64,
        #[arg(long)]
        field: String,
        #[arg(long)]
        value: String,
    },
    /// Delete a book by id
    DeleteBook {
        #[arg(long, default_value = "ebookstore")]
        path: PathBuf,
        #[arg(long)]
        id: i64,
    },
    /// Search books: --by a (author id) | t (title) | b (book id)
    Search {
        #[arg(long, default_value = "ebookstore")]
        path: PathBuf,
        #[arg(long)]
        by: String,
        #[arg(long)]
        value: String,
        /// Print a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Title, author name and country of every book with a known author
    Details {
        #[arg(long, default_value = "ebookstore")]
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Overwrite the backup area with the current books and authors
    Backup {
        #[arg(long, default_value = "ebookstore")]
        path: PathBuf,
    },
    /// Replace books and authors with the backup area
    Restore {
        #[arg(long, default_value = "ebookstore")]
        path: PathBuf,
    },
    /// Fold the WAL into tables.img
    Checkpoint {
        #[arg(long, default_value = "ebookstore")]
        path: PathBuf,
    },
    /// Counts, lsn, WAL size and metrics
    Status {
        #[arg(long, default_value = "ebookstore")]
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Remove all persisted state of the root
    Destroy {
        #[arg(long, default_value = "ebookstore")]
        path: PathBuf,
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Interactive menu
    Shell {
        #[arg(long, default_value = "ebookstore")]
        path: PathBuf,
    },
}
