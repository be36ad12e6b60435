use std::fs;

use library_manager::{BookStatus, Config, Inconsistency, Library, LibraryError, RecordKind};
use tempfile::TempDir;

const ALICE: &str = "12345678901";

fn setup_library() -> (TempDir, Library) {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let library = Library::open(&Config::new(tmp.path()));
    (tmp, library)
}

#[test]
fn borrow_and_return_round_trip() {
    let (_tmp, library) = setup_library();
    library.add_book(1, "Dune", "Herbert").unwrap();
    library.add_member(ALICE, "Alice", "555").unwrap();

    library.borrow(1, ALICE, "01/01/2024").unwrap();
    let book = library.search_book(1).unwrap().unwrap();
    assert_eq!(book.status, BookStatus::Borrowed);
    let open = library.list_open_borrows().unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].book_id, 1);
    assert_eq!(open[0].member_id, ALICE);
    assert_eq!(library.list_borrowed_books().unwrap().len(), 1);
    assert!(library.list_available_books().unwrap().is_empty());

    library.return_book(1, "02/01/2024").unwrap();
    let book = library.search_book(1).unwrap().unwrap();
    assert_eq!(book.status, BookStatus::Available);
    let records = library.list_borrows().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].return_date.as_deref(), Some("02/01/2024"));
    assert!(library.list_open_borrows().unwrap().is_empty());
    assert!(library.audit().unwrap().is_empty());
}

#[test]
fn data_survives_reopening() {
    let tmp = TempDir::new().unwrap();
    {
        let library = Library::open(&Config::new(tmp.path()));
        library.add_book(1, "Dune", "Herbert").unwrap();
        library.add_book(2, "Either|Or", "Kierkegaard").unwrap();
        library.add_member(ALICE, "Alice", "555").unwrap();
        library.borrow(2, ALICE, "01/01/2024").unwrap();
    }

    let library = Library::open(&Config::new(tmp.path()));
    let books = library.list_books().unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[1].title, "Either|Or");
    assert_eq!(books[1].status, BookStatus::Borrowed);
    assert_eq!(library.search_member(ALICE).unwrap().unwrap().name, "Alice");
    assert_eq!(library.list_borrows().unwrap().len(), 1);
}

#[test]
fn existing_data_files_are_read() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("books.txt"), "5|Emma|Austen|0\n6|Ulysses|Joyce|1\n").unwrap();
    fs::write(tmp.path().join("members.txt"), "12345678901|Alice|555\n").unwrap();
    fs::write(tmp.path().join("borrows.txt"), "5|12345678901|01/01/2024|-\n").unwrap();

    let library = Library::open(&Config::new(tmp.path()));
    assert_eq!(library.list_borrowed_books().unwrap()[0].id, 5);
    assert!(library.audit().unwrap().is_empty());

    let err = library.borrow(5, ALICE, "02/01/2024").unwrap_err();
    assert!(matches!(err, LibraryError::AlreadyBorrowed(5)));

    library.return_book(5, "03/01/2024").unwrap();
    let borrows = fs::read_to_string(tmp.path().join("borrows.txt")).unwrap();
    assert_eq!(borrows, "5|12345678901|01/01/2024|03/01/2024\n");
}

#[test]
fn interrupted_borrow_is_visible_to_audit() {
    let tmp = TempDir::new().unwrap();
    let library = Library::open(&Config::new(tmp.path()));
    library.add_book(1, "Dune", "Herbert").unwrap();
    library.add_member(ALICE, "Alice", "555").unwrap();
    library.borrow(1, ALICE, "01/01/2024").unwrap();

    // simulate a crash after the ledger was written but before the catalogue
    fs::write(tmp.path().join("books.txt"), "1|Dune|Herbert|1\n").unwrap();

    assert_eq!(
        library.audit().unwrap(),
        vec![Inconsistency::AvailableWithOpenRecord(1)]
    );
}

#[test]
fn errors_describe_what_was_missing() {
    let (_tmp, library) = setup_library();

    let err = library.return_book(3, "01/01/2024").unwrap_err();
    assert!(matches!(err, LibraryError::NotFound { kind: RecordKind::OpenBorrow, .. }));
    assert_eq!(err.to_string(), "No active borrow record found with ID 3.");

    let err = library.add_member("123", "Bob", "1").unwrap_err();
    assert!(matches!(err, LibraryError::InvalidId(_)));

    let err = library.delete_book(3).unwrap_err();
    assert_eq!(err.to_string(), "No book found with ID 3.");
}

#[test]
fn open_marker_return_leaves_files_untouched() {
    let tmp = TempDir::new().unwrap();
    let library = Library::open(&Config::new(tmp.path()));
    library.add_book(1, "Dune", "Herbert").unwrap();
    library.add_member(ALICE, "Alice", "555").unwrap();
    library.borrow(1, ALICE, "01/01/2024").unwrap();
    let books = fs::read_to_string(tmp.path().join("books.txt")).unwrap();
    let borrows = fs::read_to_string(tmp.path().join("borrows.txt")).unwrap();

    let err = library.return_book(1, "-").unwrap_err();
    assert!(matches!(err, LibraryError::InvalidReturnDate(_)));
    assert_eq!(fs::read_to_string(tmp.path().join("books.txt")).unwrap(), books);
    assert_eq!(fs::read_to_string(tmp.path().join("borrows.txt")).unwrap(), borrows);
    assert!(library.audit().unwrap().is_empty());
}

#[test]
fn capacity_limit_comes_from_config() {
    let tmp = TempDir::new().unwrap();
    let library = Library::open(&Config::new(tmp.path()).with_capacity(Some(1)));
    library.add_book(1, "Dune", "Herbert").unwrap();

    let err = library.add_book(2, "Emma", "Austen").unwrap_err();
    assert!(matches!(err, LibraryError::CapacityExceeded { capacity: 1, .. }));
}
