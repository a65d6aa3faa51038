//! Interactive menu over a `Store`.
//!
//! Generic over `BufRead`/`Write`, so the same loop serves the terminal and
//! headless callers (tests feed it a `Cursor`). EOF anywhere exits the loop.
//! A failed command prints `Error: <message>` and returns to the menu.

use anyhow::Result;
use std::io::{BufRead, Write};

use crate::model::BookId;
use crate::store::Store;

const SEPARATOR: &str = "--------------------------------";

const MENU: &str = "
Please select an option to continue:
1. Enter new book
2. Enter new author
3. Update book information
4. Delete book entry
5. Search for book
6. View details of all books
7. Backup management
0. Exit";

const UPDATE_MENU: &str = "
Information to update:
a - AuthorID
t - Title
q - Quantity";

const SEARCH_MENU: &str = "
Search type:
a - AuthorID
t - Title
b - book ID";

const BACKUP_MENU: &str = "
Backup management option:
b - Backup database
r - Restore database to previous backup";

struct Shell<'a, R, W> {
    store: &'a mut Store,
    input: R,
    out: W,
}

/// Run the menu loop until `0` or end of input.
pub fn run_shell<R: BufRead, W: Write>(store: &mut Store, input: R, out: W) -> Result<()> {
    let mut sh = Shell { store, input, out };
    writeln!(sh.out, "Welcome to the bookstore inventory")?;
    sh.run()?;
    writeln!(sh.out, "Exiting Application")?;
    sh.out.flush()?;
    Ok(())
}

/// Outcome of reading a numeric answer.
enum Number<T> {
    Value(T),
    Invalid,
    Eof,
}

impl<R: BufRead, W: Write> Shell<'_, R, W> {
    fn run(&mut self) -> Result<()> {
        loop {
            let choice = match self.number::<i64>(MENU)? {
                Number::Value(v) => v,
                Number::Invalid => {
                    writeln!(self.out, "Error: Please input a number")?;
                    continue;
                }
                Number::Eof => return Ok(()),
            };
            let keep_going = match choice {
                0 => false,
                1 => self.new_book()?,
                2 => self.new_author()?,
                3 => self.update_book()?,
                4 => self.delete_book()?,
                5 => self.search()?,
                6 => {
                    self.details()?;
                    true
                }
                7 => self.backup_management()?,
                _ => {
                    writeln!(self.out, "Error: No valid option. Please enter a number")?;
                    true
                }
            };
            if !keep_going {
                return Ok(());
            }
        }
    }

    /// Print `prompt`, read one line without its terminator. `None` at EOF.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        writeln!(self.out, "{}", prompt)?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn number<T: std::str::FromStr>(&mut self, prompt: &str) -> Result<Number<T>> {
        Ok(match self.ask(prompt)? {
            None => Number::Eof,
            Some(s) => match s.trim().parse::<T>() {
                Ok(v) => Number::Value(v),
                Err(_) => Number::Invalid,
            },
        })
    }

    /// Read a number for a command; prints the error on bad input.
    /// `Ok(None)` means: abort the command (bad input or EOF, see `eof`).
    fn command_number<T: std::str::FromStr>(
        &mut self,
        prompt: &str,
        eof: &mut bool,
    ) -> Result<Option<T>> {
        match self.number::<T>(prompt)? {
            Number::Value(v) => Ok(Some(v)),
            Number::Invalid => {
                writeln!(self.out, "Error: Please input a number")?;
                Ok(None)
            }
            Number::Eof => {
                *eof = true;
                Ok(None)
            }
        }
    }

    fn new_book(&mut self) -> Result<bool> {
        writeln!(self.out, "Selected: Enter new book.\nPlease input:")?;
        let Some(title) = self.ask("Book title:")? else {
            return Ok(false);
        };
        let mut eof = false;
        let Some(author_id) = self.command_number::<i64>("Book author ID:", &mut eof)? else {
            return Ok(!eof);
        };
        let Some(qty) = self.command_number::<u32>("Amount of books:", &mut eof)? else {
            return Ok(!eof);
        };
        match self.store.add_book(&title, author_id, qty) {
            Ok(id) => writeln!(self.out, "\nAdded {} to the database with an ID of {}.", title, id)?,
            Err(e) => writeln!(self.out, "Error: {}", e)?,
        }
        Ok(true)
    }

    fn new_author(&mut self) -> Result<bool> {
        writeln!(self.out, "Selected: Enter new author.\nPlease input:")?;
        let Some(name) = self.ask("Author's name:")? else {
            return Ok(false);
        };
        let Some(country) = self.ask("Author's country:")? else {
            return Ok(false);
        };
        match self.store.add_author(&name, &country) {
            Ok(id) => writeln!(self.out, "Added author {} with an ID of {}.", name, id)?,
            Err(e) => writeln!(self.out, "Error: {}", e)?,
        }
        Ok(true)
    }

    fn update_book(&mut self) -> Result<bool> {
        writeln!(self.out, "Selected: Update book information.\nPlease input:")?;
        let mut eof = false;
        let Some(id) = self.command_number::<BookId>("Book ID:", &mut eof)? else {
            return Ok(!eof);
        };
        let Some(choice) = self.ask(UPDATE_MENU)? else {
            return Ok(false);
        };
        let Some(value) = self.ask("New value for selected option:")? else {
            return Ok(false);
        };
        match self.store.update_book_field(id, &choice, &value) {
            Ok(()) => writeln!(self.out, "Updated book {}.", id)?,
            Err(e) => writeln!(self.out, "Error: {}", e)?,
        }
        Ok(true)
    }

    fn delete_book(&mut self) -> Result<bool> {
        writeln!(self.out, "Selected: Delete book.\nPlease input:")?;
        let mut eof = false;
        let Some(id) = self.command_number::<BookId>("Book id:", &mut eof)? else {
            return Ok(!eof);
        };
        match self.store.delete_book(id) {
            Ok(()) => writeln!(self.out, "The book with an ID: {} was deleted", id)?,
            Err(e) => writeln!(self.out, "Error: {}", e)?,
        }
        Ok(true)
    }

    fn search(&mut self) -> Result<bool> {
        writeln!(self.out, "Selected: Search book.\nPlease input:")?;
        let Some(choice) = self.ask(SEARCH_MENU)? else {
            return Ok(false);
        };
        let Some(value) = self.ask("Search Value:")? else {
            return Ok(false);
        };
        match self.store.search_books_by(&choice, &value) {
            Ok(books) if books.is_empty() => {
                writeln!(self.out, "Error: There is no book with the {} value.", value)?
            }
            Ok(books) => {
                writeln!(self.out, "\nSearch Results:")?;
                for b in &books {
                    writeln!(self.out, "{}\n{}", SEPARATOR, b)?;
                }
            }
            Err(e) => writeln!(self.out, "Error: {}", e)?,
        }
        Ok(true)
    }

    fn details(&mut self) -> Result<()> {
        writeln!(self.out, "Selected: View details of all books.")?;
        writeln!(self.out, "\nDetails")?;
        for d in self.store.list_details() {
            writeln!(self.out, "{}\n{}", SEPARATOR, d)?;
        }
        Ok(())
    }

    fn backup_management(&mut self) -> Result<bool> {
        writeln!(self.out, "Selected: Backup management.\nPlease input:")?;
        let Some(choice) = self.ask(BACKUP_MENU)? else {
            return Ok(false);
        };
        match choice.trim().to_ascii_lowercase().as_str() {
            "b" => match self.store.backup() {
                Ok(()) => writeln!(self.out, "The database was backed up")?,
                Err(e) => writeln!(self.out, "Error: {}", e)?,
            },
            "r" => match self.store.restore() {
                Ok(()) => writeln!(self.out, "Database restored to last backup")?,
                Err(e) => writeln!(self.out, "Error: {}", e)?,
            },
            _ => writeln!(self.out, "Error: No valid option")?,
        }
        Ok(true)
    }
}
