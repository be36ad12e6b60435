use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{LibraryError, Result};

use super::codec::{decode_line, encode_line, Record};

/// Read/write access to one whole collection. Every call works on the full
/// sequence: there is no partial update.
pub trait RecordStore<T> {
    /// Read every record. A store that does not exist yet is an empty
    /// collection, not an error.
    fn load(&self) -> Result<Vec<T>>;

    /// Replace the stored collection with `records`.
    fn save(&self, records: &[T]) -> Result<()>;
}

/// A collection kept as one line-per-record text file.
pub struct FileStore<T> {
    path: PathBuf,
    _record: PhantomData<fn() -> T>,
}

impl<T> FileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, source: io::Error) -> LibraryError {
        LibraryError::StorageWrite {
            path: self.path.clone(),
            source,
        }
    }
}

impl<T: Record> RecordStore<T> for FileStore<T> {
    fn load(&self) -> Result<Vec<T>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store missing, starting empty");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(LibraryError::StorageRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let contents = String::from_utf8_lossy(&bytes);
        let mut records = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            match decode_line(line) {
                Some(record) => records.push(record),
                None => warn!(
                    path = %self.path.display(),
                    line = index + 1,
                    "skipping malformed record"
                ),
            }
        }

        debug!(path = %self.path.display(), count = records.len(), "loaded records");
        Ok(records)
    }

    fn save(&self, records: &[T]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| self.write_error(err))?;
        }

        let file = File::create(&self.path).map_err(|err| self.write_error(err))?;
        let mut writer = BufWriter::new(file);
        for record in records {
            writeln!(writer, "{}", encode_line(record)).map_err(|err| self.write_error(err))?;
        }
        writer.flush().map_err(|err| self.write_error(err))?;

        debug!(path = %self.path.display(), count = records.len(), "saved records");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::cell::{Cell, RefCell};

    use super::*;

    /// In-memory store that counts saves, for checking that failed operations
    /// leave storage untouched.
    pub(crate) struct MemoryStore<T> {
        records: RefCell<Vec<T>>,
        pub(crate) saves: Cell<usize>,
    }

    impl<T: Clone> MemoryStore<T> {
        pub(crate) fn new(records: Vec<T>) -> Self {
            Self {
                records: RefCell::new(records),
                saves: Cell::new(0),
            }
        }

        pub(crate) fn snapshot(&self) -> Vec<T> {
            self.records.borrow().clone()
        }
    }

    impl<T: Clone> RecordStore<T> for MemoryStore<T> {
        fn load(&self) -> Result<Vec<T>> {
            Ok(self.snapshot())
        }

        fn save(&self, records: &[T]) -> Result<()> {
            *self.records.borrow_mut() = records.to_vec();
            self.saves.set(self.saves.get() + 1);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::models::{Book, BookStatus, BorrowRecord};

    #[test]
    fn missing_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let store: FileStore<Book> = FileStore::new(tmp.path().join("books.txt"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_keeps_records_in_order() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("nested").join("books.txt"));
        let mut borrowed = Book::new(2, "Emma", "Austen");
        borrowed.status = BookStatus::Borrowed;
        let books = vec![Book::new(1, "Dune", "Herbert"), borrowed];

        store.save(&books).unwrap();
        assert_eq!(store.load().unwrap(), books);
    }

    #[test]
    fn save_overwrites_previous_contents() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("borrows.txt"));
        store
            .save(&[
                BorrowRecord::open(1, "12345678901", "01/01/2024"),
                BorrowRecord::open(2, "12345678901", "01/01/2024"),
            ])
            .unwrap();
        store
            .save(&[BorrowRecord::open(3, "12345678901", "05/01/2024")])
            .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].book_id, 3);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("books.txt");
        fs::write(&path, "1|Dune|Herbert|1\ngarbage\n\n2|Emma|Austen|0\r\n").unwrap();

        let store: FileStore<Book> = FileStore::new(path);
        let ids: Vec<i64> = store.load().unwrap().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn unwritable_store_reports_write_failure() {
        let tmp = TempDir::new().unwrap();
        // a directory cannot be opened as a file
        let store: FileStore<Book> = FileStore::new(tmp.path());
        let err = store.save(&[Book::new(1, "Dune", "Herbert")]).unwrap_err();
        assert!(matches!(err, LibraryError::StorageWrite { .. }));
    }

    #[test]
    fn unreadable_store_reports_read_failure() {
        let tmp = TempDir::new().unwrap();
        let store: FileStore<Book> = FileStore::new(tmp.path());
        let err = store.load().unwrap_err();
        assert!(matches!(err, LibraryError::StorageRead { .. }));
    }
}
