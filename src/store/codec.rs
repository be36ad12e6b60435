//! Line codec for the `|`-delimited data files.
//!
//! Each record is one line with its fields joined by [`DELIMITER`]. Fields are
//! backslash-escaped on the way out (`\\`, `\|`, `\n`, `\r`) so a title that
//! contains the delimiter or a line break can no longer split a record. Fields
//! without a backslash are written verbatim, so older files load unchanged as
//! long as their fields hold no backslash. An older field that happens to
//! contain one of the four escape sequences is unescaped on load.

use std::mem;

use crate::models::{Book, BookStatus, BorrowRecord, Member, MemberId};

pub const DELIMITER: char = '|';
/// On-disk stand-in for a borrow that has not been returned yet.
pub const OPEN_SENTINEL: &str = "-";

/// A type that can be flattened into a fixed number of text fields.
pub trait Record: Sized {
    /// Number of fields a well-formed line carries.
    const FIELDS: usize;

    fn encode(&self) -> Vec<String>;

    /// Rebuild a record from already-unescaped fields. Returns `None` when a
    /// field does not parse, which makes the loader skip the line.
    fn decode(fields: &[String]) -> Option<Self>;
}

/// Serialize a record into a single line without the trailing newline.
pub fn encode_line<T: Record>(record: &T) -> String {
    record
        .encode()
        .iter()
        .map(|field| escape(field))
        .collect::<Vec<_>>()
        .join("|")
}

/// Parse one line, rejecting it if the field count is wrong or any field
/// fails to decode.
pub fn decode_line<T: Record>(line: &str) -> Option<T> {
    let fields = split_fields(line);
    if fields.len() != T::FIELDS {
        return None;
    }
    T::decode(&fields)
}

fn escape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for ch in field.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            DELIMITER => out.push_str("\\|"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}

/// Split on unescaped delimiters and undo escaping. Unknown escapes are kept
/// literally so a stray backslash in an old file does not cost the record.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some('\\') => current.push('\\'),
                Some(DELIMITER) => current.push(DELIMITER),
                Some('n') => current.push('\n'),
                Some('r') => current.push('\r'),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => current.push('\\'),
            },
            DELIMITER => fields.push(mem::take(&mut current)),
            _ => current.push(ch),
        }
    }

    fields.push(current);
    fields
}

impl Record for Book {
    const FIELDS: usize = 4;

    fn encode(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            self.author.clone(),
            self.status.code().to_string(),
        ]
    }

    fn decode(fields: &[String]) -> Option<Self> {
        let id = fields[0].trim().parse().ok()?;
        let status = fields[3].trim().parse().ok().and_then(BookStatus::from_code)?;
        Some(Book {
            id,
            title: fields[1].clone(),
            author: fields[2].clone(),
            status,
        })
    }
}

impl Record for Member {
    const FIELDS: usize = 3;

    fn encode(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), self.phone.clone()]
    }

    fn decode(fields: &[String]) -> Option<Self> {
        let id: MemberId = fields[0].parse().ok()?;
        Some(Member {
            id,
            name: fields[1].clone(),
            phone: fields[2].clone(),
        })
    }
}

impl Record for BorrowRecord {
    const FIELDS: usize = 4;

    fn encode(&self) -> Vec<String> {
        vec![
            self.book_id.to_string(),
            self.member_id.clone(),
            self.borrow_date.clone(),
            self.return_date
                .clone()
                .unwrap_or_else(|| OPEN_SENTINEL.to_string()),
        ]
    }

    fn decode(fields: &[String]) -> Option<Self> {
        let book_id = fields[0].trim().parse().ok()?;
        let return_date = match fields[3].as_str() {
            OPEN_SENTINEL => None,
            date => Some(date.to_string()),
        };
        Some(BorrowRecord {
            book_id,
            member_id: fields[1].clone(),
            borrow_date: fields[2].clone(),
            return_date,
        })
    }
}
