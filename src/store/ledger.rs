//! The borrow ledger and the lending state machine.
//!
//! A book moves Available -> Borrowed on a successful borrow and back on a
//! successful return; nothing else changes its status. The ledger is
//! append-only: returning a book fills in the return date of its open record.
//!
//! Both operations save the ledger first and the catalogue second. The two
//! writes are independent, so a failure between them leaves the files
//! disagreeing; `Library::audit` reports that state.

use tracing::{debug, info};

use crate::error::{LibraryError, RecordKind, Result};
use crate::models::{Book, BookStatus, BorrowRecord, Member};

use super::codec::OPEN_SENTINEL;
use super::{ensure_capacity, BookRepository, FileStore, MemberRepository, RecordStore};

pub struct BorrowLedger<S = FileStore<BorrowRecord>> {
    store: S,
    capacity: Option<usize>,
}

impl<S: RecordStore<BorrowRecord>> BorrowLedger<S> {
    pub fn new(store: S, capacity: Option<usize>) -> Self {
        Self { store, capacity }
    }

    pub fn load(&self) -> Result<Vec<BorrowRecord>> {
        self.store.load()
    }

    /// Lend `book_id` to `member_id`, opening a new record dated
    /// `borrow_date`.
    pub fn borrow<B, M>(
        &self,
        books: &BookRepository<B>,
        members: &MemberRepository<M>,
        book_id: i64,
        member_id: &str,
        borrow_date: &str,
    ) -> Result<BorrowRecord>
    where
        B: RecordStore<Book>,
        M: RecordStore<Member>,
    {
        let mut catalogue = books.load()?;
        let registered = members.load()?;
        let mut records = self.load()?;

        let record = lend(
            &mut catalogue,
            &registered,
            &mut records,
            self.capacity,
            book_id,
            member_id,
            borrow_date,
        )?;

        self.store.save(&records)?;
        books.save(&catalogue)?;
        info!(book_id, member_id, "book borrowed");
        Ok(record)
    }

    /// Close the first open record for `book_id` with `return_date` and put
    /// the book back on the shelf.
    pub fn return_book<B>(
        &self,
        books: &BookRepository<B>,
        book_id: i64,
        return_date: &str,
    ) -> Result<BorrowRecord>
    where
        B: RecordStore<Book>,
    {
        let mut catalogue = books.load()?;
        let mut records = self.load()?;

        let record = close(&mut catalogue, &mut records, book_id, return_date)?;

        self.store.save(&records)?;
        books.save(&catalogue)?;
        info!(book_id, "book returned");
        Ok(record)
    }

    /// Every record in the order it was opened.
    pub fn list(&self) -> Result<Vec<BorrowRecord>> {
        self.load()
    }

    /// Records for books that are still out.
    pub fn list_open(&self) -> Result<Vec<BorrowRecord>> {
        Ok(self.load()?.into_iter().filter(BorrowRecord::is_open).collect())
    }
}

/// Borrow transition over already-loaded collections. Nothing is touched
/// unless every check passes.
fn lend(
    books: &mut [Book],
    members: &[Member],
    records: &mut Vec<BorrowRecord>,
    capacity: Option<usize>,
    book_id: i64,
    member_id: &str,
    borrow_date: &str,
) -> Result<BorrowRecord> {
    let book = books
        .iter_mut()
        .find(|book| book.id == book_id)
        .ok_or_else(|| LibraryError::not_found(RecordKind::Book, book_id))?;

    if book.status == BookStatus::Borrowed {
        return Err(LibraryError::AlreadyBorrowed(book_id));
    }

    if !members.iter().any(|member| member.id == *member_id) {
        return Err(LibraryError::not_found(RecordKind::Member, member_id));
    }

    ensure_capacity(records.len(), capacity, "borrow")?;

    let record = BorrowRecord::open(book_id, member_id, borrow_date);
    records.push(record.clone());
    book.status = BookStatus::Borrowed;
    Ok(record)
}

/// Return transition over already-loaded collections. Only the first open
/// record is closed; a book missing from the catalogue is tolerated. The open
/// marker itself is not a return date: storing it would leave the record open
/// behind an available book.
fn close(
    books: &mut [Book],
    records: &mut [BorrowRecord],
    book_id: i64,
    return_date: &str,
) -> Result<BorrowRecord> {
    if return_date.trim() == OPEN_SENTINEL {
        return Err(LibraryError::InvalidReturnDate(return_date.to_string()));
    }

    let record = records
        .iter_mut()
        .find(|record| record.book_id == book_id && record.is_open())
        .ok_or_else(|| LibraryError::not_found(RecordKind::OpenBorrow, book_id))?;

    record.return_date = Some(return_date.to_string());
    let closed = record.clone();

    match books.iter_mut().find(|book| book.id == book_id) {
        Some(book) => book.status = BookStatus::Available,
        None => debug!(book_id, "returned book is no longer catalogued"),
    }

    Ok(closed)
}
