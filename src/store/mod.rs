//! Persistence layer split across logical submodules. Every repository
//! operation loads its whole collection, mutates it in memory, and rewrites
//! the backing file before returning.

mod books;
pub mod codec;
mod file;
mod ledger;
mod members;

pub use books::BookRepository;
pub use file::{FileStore, RecordStore};
pub use ledger::BorrowLedger;
pub use members::MemberRepository;

use crate::error::{LibraryError, Result};

/// Fail with `CapacityExceeded` when a collection of `len` records is already
/// full.
fn ensure_capacity(len: usize, capacity: Option<usize>, kind: &'static str) -> Result<()> {
    match capacity {
        Some(capacity) if len >= capacity => {
            Err(LibraryError::CapacityExceeded { kind, capacity })
        }
        _ => Ok(()),
    }
}
