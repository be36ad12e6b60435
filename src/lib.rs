//! Core library surface for the library records manager.
//!
//! Books, members and borrow records live in three `|`-delimited text files.
//! The [`Library`] facade is the only entry point the terminal UI uses; the
//! `store` module underneath keeps the lending rules and file handling.
pub mod config;
pub mod error;
pub mod library;
pub mod logging;
pub mod models;
pub mod store;
pub mod ui;

pub use config::Config;
pub use error::{LibraryError, RecordKind};
pub use library::{Inconsistency, Library};

/// The three record types the UI and tests manipulate.
pub use models::{Book, BookStatus, BorrowRecord, Member, MemberId};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
