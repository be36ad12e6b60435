//! Domain models for the three collections the library keeps on disk. These
//! stay light-weight data holders; the store layer owns persistence and the
//! ledger owns the rules that tie books and borrows together.

use std::fmt;
use std::str::FromStr;

use crate::error::LibraryError;

/// Longest title or author name the input forms accept.
pub const TITLE_MAX_CHARS: usize = 99;
/// Longest member name the input forms accept.
pub const NAME_MAX_CHARS: usize = 49;
/// Longest phone number the input forms accept.
pub const PHONE_MAX_CHARS: usize = 19;
/// Exact number of digits in a member ID.
pub const MEMBER_ID_LEN: usize = 11;

/// Whether a book is on the shelf or out with a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookStatus {
    Available,
    Borrowed,
}

impl BookStatus {
    /// Numeric code written to `books.txt`. `1` means available and `0`
    /// borrowed, which keeps existing data files readable.
    pub fn code(self) -> u8 {
        match self {
            BookStatus::Available => 1,
            BookStatus::Borrowed => 0,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(BookStatus::Available),
            0 => Some(BookStatus::Borrowed),
            _ => None,
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookStatus::Available => f.write_str("Available"),
            BookStatus::Borrowed => f.write_str("Borrowed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A catalogue entry. The `id` is chosen by the librarian and must be unique
/// across the collection.
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Only the borrow ledger flips this after creation.
    pub status: BookStatus,
}

impl Book {
    /// Build a freshly catalogued book, which always starts out available.
    pub fn new(id: i64, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            status: BookStatus::Available,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == BookStatus::Available
    }
}

/// A member's national ID number: exactly eleven ASCII digits.
///
/// The only way to get one is through [`MemberId::from_str`], so every
/// `MemberId` in memory has already passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberId(String);

impl MemberId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for MemberId {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == MEMBER_ID_LEN && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_string()))
        } else {
            Err(LibraryError::InvalidId(s.to_string()))
        }
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for MemberId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A registered borrower. Members are never edited or removed once added.
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One lending transaction. Records are append-only; returning a book only
/// fills in `return_date`.
pub struct BorrowRecord {
    /// Not a foreign key: the book may have been deleted since.
    pub book_id: i64,
    pub member_id: String,
    /// Free-form, conventionally `dd/mm/yyyy`.
    pub borrow_date: String,
    /// `None` while the book is still out.
    pub return_date: Option<String>,
}

impl BorrowRecord {
    /// Open a new record for a book that has just left the shelf.
    pub fn open(book_id: i64, member_id: impl Into<String>, borrow_date: impl Into<String>) -> Self {
        Self {
            book_id,
            member_id: member_id.into(),
            borrow_date: borrow_date.into(),
            return_date: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("12345678901" ; "eleven digits")]
    #[test_case("00000000000" ; "leading zeros")]
    fn accepts_valid_member_ids(raw: &str) {
        let id: MemberId = raw.parse().unwrap();
        assert_eq!(id.as_str(), raw);
    }

    #[test_case("" ; "empty")]
    #[test_case("1234567890" ; "ten digits")]
    #[test_case("123456789012" ; "twelve digits")]
    #[test_case("1234567890a" ; "trailing letter")]
    #[test_case(" 1234567890" ; "leading space")]
    #[test_case("１２３４５６７８９０１" ; "full width digits")]
    fn rejects_invalid_member_ids(raw: &str) {
        let err = raw.parse::<MemberId>().unwrap_err();
        assert!(matches!(err, LibraryError::InvalidId(ref id) if id == raw));
    }

    #[test]
    fn status_codes_match_data_files() {
        assert_eq!(BookStatus::Available.code(), 1);
        assert_eq!(BookStatus::Borrowed.code(), 0);
        assert_eq!(BookStatus::from_code(1), Some(BookStatus::Available));
        assert_eq!(BookStatus::from_code(0), Some(BookStatus::Borrowed));
        assert_eq!(BookStatus::from_code(2), None);
    }

    #[test]
    fn new_books_start_available() {
        let book = Book::new(7, "Dune", "Herbert");
        assert!(book.is_available());
    }
}
