use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".library-manager";
/// Backing file for the book catalogue.
pub const BOOKS_FILE: &str = "books.txt";
/// Backing file for registered members.
pub const MEMBERS_FILE: &str = "members.txt";
/// Backing file for the borrow ledger.
pub const BORROWS_FILE: &str = "borrows.txt";
/// Log output lives next to the data because the terminal belongs to the UI.
pub const LOG_FILE: &str = "library.log";
/// Per-collection record limit carried over from the fixed-size tables the
/// data files were first written with.
pub const DEFAULT_CAPACITY: usize = 100;

/// Where the library keeps its files and how many records each collection may
/// hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    /// `None` lifts the limit entirely.
    pub capacity: Option<usize>,
}

impl Config {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            capacity: Some(DEFAULT_CAPACITY),
        }
    }

    /// Resolve the default data directory inside the user's home.
    pub fn locate() -> Result<Self> {
        let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
        Ok(Self::new(base_dirs.home_dir().join(DATA_DIR_NAME)))
    }

    #[must_use]
    pub fn with_capacity(mut self, capacity: Option<usize>) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn books_path(&self) -> PathBuf {
        self.data_dir.join(BOOKS_FILE)
    }

    pub fn members_path(&self) -> PathBuf {
        self.data_dir.join(MEMBERS_FILE)
    }

    pub fn borrows_path(&self) -> PathBuf {
        self.data_dir.join(BORROWS_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_live_under_the_data_dir() {
        let config = Config::new("/srv/library");
        assert_eq!(config.books_path(), Path::new("/srv/library/books.txt"));
        assert_eq!(config.members_path(), Path::new("/srv/library/members.txt"));
        assert_eq!(config.borrows_path(), Path::new("/srv/library/borrows.txt"));
        assert_eq!(config.capacity, Some(DEFAULT_CAPACITY));
    }

    #[test]
    fn capacity_can_be_lifted() {
        let config = Config::new("/tmp/x").with_capacity(None);
        assert_eq!(config.capacity, None);
    }
}
