use tracing::info;

use crate::error::{LibraryError, RecordKind, Result};
use crate::models::{Book, BookStatus};

use super::{ensure_capacity, FileStore, RecordStore};

/// The book catalogue. IDs are unique; insertion order is storage order until
/// a delete swaps the last record into the hole.
pub struct BookRepository<S = FileStore<Book>> {
    store: S,
    capacity: Option<usize>,
}

impl<S: RecordStore<Book>> BookRepository<S> {
    pub fn new(store: S, capacity: Option<usize>) -> Self {
        Self { store, capacity }
    }

    pub fn load(&self) -> Result<Vec<Book>> {
        self.store.load()
    }

    pub fn save(&self, books: &[Book]) -> Result<()> {
        self.store.save(books)
    }

    /// Catalogue a new, available book.
    pub fn add(&self, id: i64, title: &str, author: &str) -> Result<Book> {
        let mut books = self.load()?;
        ensure_capacity(books.len(), self.capacity, "book")?;
        if books.iter().any(|book| book.id == id) {
            return Err(LibraryError::duplicate(RecordKind::Book, id));
        }

        let book = Book::new(id, title, author);
        books.push(book.clone());
        self.save(&books)?;
        info!(id, "book added");
        Ok(book)
    }

    /// Remove a book and return it.
    ///
    /// Deletion is swap-with-last: the final record moves into the removed
    /// record's slot, so the order of the remaining books is not preserved.
    /// Borrow history that references the book is left alone.
    pub fn delete(&self, id: i64) -> Result<Book> {
        let mut books = self.load()?;
        let index = books
            .iter()
            .position(|book| book.id == id)
            .ok_or_else(|| LibraryError::not_found(RecordKind::Book, id))?;

        let removed = books.swap_remove(index);
        self.save(&books)?;
        info!(id, "book deleted");
        Ok(removed)
    }

    pub fn search(&self, id: i64) -> Result<Option<Book>> {
        Ok(self.load()?.into_iter().find(|book| book.id == id))
    }

    pub fn list(&self) -> Result<Vec<Book>> {
        self.load()
    }

    pub fn list_available(&self) -> Result<Vec<Book>> {
        self.list_with_status(BookStatus::Available)
    }

    pub fn list_borrowed(&self) -> Result<Vec<Book>> {
        self.list_with_status(BookStatus::Borrowed)
    }

    fn list_with_status(&self, status: BookStatus) -> Result<Vec<Book>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|book| book.status == status)
            .collect())
    }
}
