//! Error taxonomy of the public store API.
//!
//! Storage layers (meta, image, WAL, lock) work with `anyhow::Result` and
//! attach context; failures surface here as `StoreError::Storage`.

use crate::model::{AuthorId, BookId};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An operation referenced an author that does not exist.
    #[error("AuthorID {0} does not exist")]
    Reference(AuthorId),

    /// An operation referenced a book that does not exist.
    #[error("BookID {0} does not exist")]
    NotFound(BookId),

    /// A field/operation selector outside the recognized set.
    #[error("no valid option '{option}' (expected one of: {expected})")]
    InvalidOption {
        option: String,
        expected: &'static str,
    },

    /// The value cannot be parsed for the selected field.
    #[error("invalid value '{value}' for {field}")]
    InvalidValue { field: &'static str, value: String },

    /// Restore requested but no backup was ever taken.
    #[error("no backups exist")]
    NoBackup,

    /// The author id bound no longer fits into an i64.
    #[error("author id space exhausted")]
    IdSpaceExhausted,

    /// I/O, corruption, lock contention.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub(crate) fn invalid_option(option: &str, expected: &'static str) -> Self {
        StoreError::InvalidOption {
            option: option.to_string(),
            expected,
        }
    }
}
