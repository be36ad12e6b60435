//! Facade over the three file-backed collections of one data directory. This
//! is the whole surface the UI is allowed to touch: it hands over parsed
//! arguments and gets records or a [`LibraryError`] back.

use std::collections::HashMap;
use std::fmt;

use crate::config::Config;
use crate::error::Result;
use crate::models::{Book, BookStatus, BorrowRecord, Member};
use crate::store::{BookRepository, BorrowLedger, FileStore, MemberRepository};

/// A disagreement between the catalogue and the ledger. These can only arise
/// from a crash or write failure between the two saves of a borrow or return,
/// or from hand-edited files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    BorrowedWithoutRecord(i64),
    AvailableWithOpenRecord(i64),
    DuplicateOpenRecords { book_id: i64, count: usize },
    OrphanedRecord(i64),
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inconsistency::BorrowedWithoutRecord(id) => {
                write!(f, "Book {id} is marked borrowed but has no open borrow record")
            }
            Inconsistency::AvailableWithOpenRecord(id) => {
                write!(f, "Book {id} is marked available but has an open borrow record")
            }
            Inconsistency::DuplicateOpenRecords { book_id, count } => {
                write!(f, "Book {book_id} has {count} open borrow records")
            }
            Inconsistency::OrphanedRecord(id) => {
                write!(f, "Open borrow record for book {id}, which is not in the catalogue")
            }
        }
    }
}

pub struct Library {
    books: BookRepository,
    members: MemberRepository,
    ledger: BorrowLedger,
}

impl Library {
    /// Wire the three stores to their files under `config.data_dir`. Nothing
    /// is read until the first operation.
    pub fn open(config: &Config) -> Self {
        Self {
            books: BookRepository::new(FileStore::new(config.books_path()), config.capacity),
            members: MemberRepository::new(FileStore::new(config.members_path()), config.capacity),
            ledger: BorrowLedger::new(FileStore::new(config.borrows_path()), config.capacity),
        }
    }

    pub fn add_book(&self, id: i64, title: &str, author: &str) -> Result<Book> {
        self.books.add(id, title, author)
    }

    pub fn delete_book(&self, id: i64) -> Result<Book> {
        self.books.delete(id)
    }

    pub fn search_book(&self, id: i64) -> Result<Option<Book>> {
        self.books.search(id)
    }

    pub fn list_books(&self) -> Result<Vec<Book>> {
        self.books.list()
    }

    pub fn list_available_books(&self) -> Result<Vec<Book>> {
        self.books.list_available()
    }

    pub fn list_borrowed_books(&self) -> Result<Vec<Book>> {
        self.books.list_borrowed()
    }

    pub fn add_member(&self, id: &str, name: &str, phone: &str) -> Result<Member> {
        self.members.add(id, name, phone)
    }

    pub fn search_member(&self, id: &str) -> Result<Option<Member>> {
        self.members.search(id)
    }

    pub fn list_members(&self) -> Result<Vec<Member>> {
        self.members.list()
    }

    pub fn borrow(&self, book_id: i64, member_id: &str, borrow_date: &str) -> Result<BorrowRecord> {
        self.ledger
            .borrow(&self.books, &self.members, book_id, member_id, borrow_date)
    }

    pub fn return_book(&self, book_id: i64, return_date: &str) -> Result<BorrowRecord> {
        self.ledger.return_book(&self.books, book_id, return_date)
    }

    pub fn list_borrows(&self) -> Result<Vec<BorrowRecord>> {
        self.ledger.list()
    }

    pub fn list_open_borrows(&self) -> Result<Vec<BorrowRecord>> {
        self.ledger.list_open()
    }

    /// Cross-check book statuses against open ledger records. Reports in
    /// catalogue order, then orphaned records in ledger order. Nothing is
    /// repaired.
    pub fn audit(&self) -> Result<Vec<Inconsistency>> {
        let books = self.books.load()?;
        let records = self.ledger.load()?;
        Ok(audit(&books, &records))
    }
}

fn audit(books: &[Book], records: &[BorrowRecord]) -> Vec<Inconsistency> {
    let mut open_counts: HashMap<i64, usize> = HashMap::new();
    for record in records.iter().filter(|record| record.is_open()) {
        *open_counts.entry(record.book_id).or_default() += 1;
    }

    let mut findings = Vec::new();
    for book in books {
        let open = open_counts.get(&book.id).copied().unwrap_or(0);
        match (book.status, open) {
            (BookStatus::Borrowed, 0) => {
                findings.push(Inconsistency::BorrowedWithoutRecord(book.id));
            }
            (BookStatus::Available, n) if n > 0 => {
                findings.push(Inconsistency::AvailableWithOpenRecord(book.id));
            }
            _ => {}
        }
        if open > 1 {
            findings.push(Inconsistency::DuplicateOpenRecords {
                book_id: book.id,
                count: open,
            });
        }
    }

    let mut reported = Vec::new();
    for record in records.iter().filter(|record| record.is_open()) {
        let catalogued = books.iter().any(|book| book.id == record.book_id);
        if !catalogued && !reported.contains(&record.book_id) {
            reported.push(record.book_id);
            findings.push(Inconsistency::OrphanedRecord(record.book_id));
        }
    }

    findings
}
