//! Error type shared by the store layer and the library facade. Every variant
//! is recoverable: the UI turns it into a footer message and carries on.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Which collection (or which kind of lookup) an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Book,
    Member,
    OpenBorrow,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Book => f.write_str("book"),
            RecordKind::Member => f.write_str("member"),
            RecordKind::OpenBorrow => f.write_str("active borrow record"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("No {kind} found with ID {id}.")]
    NotFound { kind: RecordKind, id: String },

    #[error("A {kind} with ID {id} already exists.")]
    DuplicateId { kind: RecordKind, id: String },

    #[error("Invalid member ID {0:?}: expected exactly 11 digits.")]
    InvalidId(String),

    #[error("Invalid return date {0:?}: it marks a book that is still out.")]
    InvalidReturnDate(String),

    #[error("Book {0} is already borrowed.")]
    AlreadyBorrowed(i64),

    #[error("Maximum number of {kind} records reached ({capacity}).")]
    CapacityExceeded { kind: &'static str, capacity: usize },

    #[error("Failed to write {}", path.display())]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {}", path.display())]
    StorageRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LibraryError {
    pub(crate) fn not_found(kind: RecordKind, id: impl ToString) -> Self {
        LibraryError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn duplicate(kind: RecordKind, id: impl ToString) -> Self {
        LibraryError::DuplicateId {
            kind,
            id: id.to_string(),
        }
    }
}

pub type Result<T, E = LibraryError> = std::result::Result<T, E>;
